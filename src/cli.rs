use std::path::PathBuf;
use structopt::StructOpt;

/// Printed when `create` is called without a usable name.
pub const CREATE_USAGE: &str = "Usage: tudu create --name <name> [--tags <tag,...>]...

Options:
    --name <name>     name of the todo (required)
    --tags <tag,...>  comma separated tags, may be repeated";

#[derive(Debug, PartialEq, StructOpt)]
pub enum Command {
    /// List all todos in the todo file.
    #[structopt(name = "ls")]
    List,
    /// Write a new todo, then list all todos.
    Create {
        /// Name of the todo.
        #[structopt(long)]
        name: Option<String>,

        /// Tags for the todo, comma separated. May be repeated.
        #[structopt(long, number_of_values = 1)]
        tags: Vec<String>,
    },
    /// Mark the todo at a position as completed, then list all todos.
    Done {
        #[structopt()]
        position: usize,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(name = "tudu", about = "A minimalistic todo list kept in a CSV file.")]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Option<Command>,

    /// Use a different todo file.
    #[structopt(parse(from_os_str), short = "f", long)]
    pub todo_file: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace).
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLineArgs {
        CommandLineArgs::from_iter_safe(std::iter::once("tudu").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn no_arguments_means_no_command() {
        let args = parse(&[]);
        assert_eq!(args.action, None);
        assert_eq!(args.todo_file, None);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn ls_is_list() {
        assert_eq!(parse(&["ls"]).action, Some(Command::List));
    }

    #[test]
    fn create_collects_name_and_repeated_tags() {
        let args = parse(&["create", "--name", "Buy milk", "--tags", "groceries,errand", "--tags", "home"]);
        assert_eq!(
            args.action,
            Some(Command::Create {
                name: Some("Buy milk".to_string()),
                tags: vec!["groceries,errand".to_string(), "home".to_string()],
            })
        );
    }

    #[test]
    fn create_without_name_still_parses() {
        assert_eq!(
            parse(&["create"]).action,
            Some(Command::Create {
                name: None,
                tags: vec![],
            })
        );
    }

    #[test]
    fn global_options() {
        let args = parse(&["-vv", "--todo-file", "/tmp/t.csv", "done", "2"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.todo_file, Some(PathBuf::from("/tmp/t.csv")));
        assert_eq!(args.action, Some(Command::Done { position: 2 }));
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(CommandLineArgs::from_iter_safe(vec!["tudu", "rm"]).is_err());
    }
}
