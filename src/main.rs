use anyhow::Context;
use chrono::Local;
use std::io;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod interface;
mod model;
mod store;

use cli::{Command::*, CommandLineArgs, CREATE_USAGE};
use interface::Completion;
use model::{validate_name, Tags};
use store::{CsvStore, DEFAULT_TODO_FILE};

/// Log to stderr, so the todo list on stdout stays clean.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Get the todo store, creating the file if it does not exist.
fn open_store(todo_file: PathBuf) -> anyhow::Result<CsvStore> {
    let store = CsvStore::open(&todo_file)
        .with_context(|| format!("Failed to open todo file {}.", todo_file.display()))?;
    tracing::debug!(path = %store.path().display(), "using todo file");
    Ok(store)
}

fn print_todos(store: &CsvStore) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    interface::list(store, &mut out).context("Failed to list todos.")
}

fn main() -> anyhow::Result<()> {
    // Get the command-line arguments.
    let CommandLineArgs {
        action,
        todo_file,
        verbose,
    } = CommandLineArgs::from_args();

    init_logging(verbose);

    let action = match action {
        Some(action) => action,
        None => {
            println!("Error: no command provided");
            process::exit(1);
        }
    };

    let todo_file = todo_file.unwrap_or_else(|| PathBuf::from(DEFAULT_TODO_FILE));

    // Perform the action.
    match action {
        List => {
            let store = open_store(todo_file)?;
            print_todos(&store)
        }
        Create { name, tags } => {
            let name = name.unwrap_or_default();
            if validate_name(&name).is_err() {
                println!("Error: --name is required");
                println!("{}", CREATE_USAGE);
                process::exit(1);
            }
            let tags = Tags::from_args(&tags);
            if let Err(e) = tags.validate() {
                println!("Error: {}", e);
                println!("{}", CREATE_USAGE);
                process::exit(1);
            }

            let mut store = open_store(todo_file)?;
            let todo = interface::add_todo(&mut store, &name, tags, Local::now())
                .context("Failed to add todo.")?;
            println!("Successfully added your new todo: {}", todo.name);

            print_todos(&store)
        }
        Done { position } => {
            let mut store = open_store(todo_file)?;
            match interface::complete_todo(&mut store, position, Local::now())
                .context("Failed to complete todo.")?
            {
                Completion::Completed(todo) => println!("Completed todo: {}", todo.name),
                Completion::AlreadyCompleted(todo) => {
                    println!("Todo already completed: {}", todo.name)
                }
            }

            print_todos(&store)
        }
    }
}
