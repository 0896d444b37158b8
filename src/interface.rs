use chrono::{DateTime, Local};
use std::io::Write;
use tracing::info;

use crate::error::{Result, TodoError};
use crate::model::{Tags, Todo};
use crate::store::TodoStore;

/// Outcome of asking for a todo to be completed.
#[derive(Debug, PartialEq)]
pub enum Completion {
    Completed(Todo),
    AlreadyCompleted(Todo),
}

/// Print every todo, in file order, numbered from 0.
///
/// The whole list is loaded before anything is printed, so a broken file
/// produces an error and no output.
pub fn list<S: TodoStore, W: Write>(store: &S, out: &mut W) -> Result<()> {
    let todos = store.load()?;

    if todos.is_empty() {
        writeln!(out, "No todo left").map_err(output_error)?;
        return Ok(());
    }

    for (position, todo) in todos.iter().enumerate() {
        writeln!(
            out,
            "S.No: {} | Name: {} | Tags: {} | Completed: {}",
            position, todo.name, todo.tags, todo.is_completed
        )
        .map_err(output_error)?;
    }
    Ok(())
}

/// Append a new pending todo and save the whole list back.
pub fn add_todo<S: TodoStore>(
    store: &mut S,
    name: &str,
    tags: Tags,
    now: DateTime<Local>,
) -> Result<Todo> {
    let todo = Todo::new(name, tags, now)?;

    let mut todos = store.load()?;
    todos.push(todo.clone());
    store.save(&todos)?;

    info!(name = %todo.name, count = todos.len(), "added todo");
    Ok(todo)
}

/// Mark the todo at the given position as completed.
pub fn complete_todo<S: TodoStore>(
    store: &mut S,
    position: usize,
    now: DateTime<Local>,
) -> Result<Completion> {
    let mut todos = store.load()?;

    let todo = todos
        .get_mut(position)
        .ok_or_else(|| TodoError::Validation(format!("no todo at position {}", position)))?;

    if !todo.complete(now) {
        return Ok(Completion::AlreadyCompleted(todo.clone()));
    }
    let completed = todo.clone();
    store.save(&todos)?;

    info!(name = %completed.name, position, "completed todo");
    Ok(Completion::Completed(completed))
}

fn output_error(e: std::io::Error) -> TodoError {
    TodoError::io("Failed to write to standard output", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    fn listed<S: TodoStore>(store: &S) -> String {
        let mut out = Vec::new();
        list(store, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_store_lists_nothing_left() {
        assert_eq!(listed(&MemoryStore::default()), "No todo left\n");
    }

    #[test]
    fn add_to_empty_store_then_list() {
        let mut store = MemoryStore::default();
        let tags = Tags::from_args(&["groceries,errand"]);
        let todo = add_todo(&mut store, "Buy milk", tags.clone(), now()).unwrap();

        assert_eq!(store.todos, vec![todo.clone()]);
        assert_eq!(todo.tags, tags);
        assert!(!todo.is_completed);
        assert_eq!(todo.completed_at, None);
        assert_eq!(
            listed(&store),
            "S.No: 0 | Name: Buy milk | Tags: groceries,errand | Completed: false\n"
        );
    }

    #[test]
    fn todos_keep_insertion_order() {
        let mut store = MemoryStore::default();
        for (i, name) in ["Task1", "Task2", "Task3"].iter().enumerate() {
            add_todo(&mut store, name, Tags::default(), now() + Duration::minutes(i as i64)).unwrap();
        }

        let names: Vec<&str> = store.todos.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Task1", "Task2", "Task3"]);
        assert_eq!(store.saves, 3);

        let out = listed(&store);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("S.No: 0 | Name: Task1"));
        assert!(lines[1].starts_with("S.No: 1 | Name: Task2"));
        assert!(lines[2].starts_with("S.No: 2 | Name: Task3"));
    }

    #[test]
    fn invalid_add_does_not_save() {
        let mut store = MemoryStore::default();
        assert!(matches!(
            add_todo(&mut store, "", Tags::default(), now()),
            Err(TodoError::Validation(_))
        ));
        assert!(matches!(
            add_todo(&mut store, "Task", Tags::new(vec!["a;b"]), now()),
            Err(TodoError::Validation(_))
        ));
        assert_eq!(store.saves, 0);
    }

    #[test]
    fn complete_sets_flag_and_time() {
        let mut store = MemoryStore::default();
        add_todo(&mut store, "Task1", Tags::default(), now()).unwrap();
        add_todo(&mut store, "Task2", Tags::default(), now()).unwrap();

        let later = now() + Duration::hours(1);
        match complete_todo(&mut store, 1, later).unwrap() {
            Completion::Completed(todo) => assert_eq!(todo.name, "Task2"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!store.todos[0].is_completed);
        assert!(store.todos[1].is_completed);
        assert_eq!(store.todos[1].completed_at, Some(later));
        assert!(listed(&store).contains("S.No: 1 | Name: Task2 | Tags:  | Completed: true"));
    }

    #[test]
    fn completing_twice_keeps_the_first_time() {
        let mut store = MemoryStore::default();
        add_todo(&mut store, "Task1", Tags::default(), now()).unwrap();
        complete_todo(&mut store, 0, now()).unwrap();
        let saves = store.saves;

        let outcome = complete_todo(&mut store, 0, now() + Duration::days(1)).unwrap();
        assert!(matches!(outcome, Completion::AlreadyCompleted(_)));
        assert_eq!(store.todos[0].completed_at, Some(now()));
        assert_eq!(store.saves, saves);
    }

    #[test]
    fn completing_a_missing_position_fails() {
        let mut store = MemoryStore::default();
        add_todo(&mut store, "Task1", Tags::default(), now()).unwrap();
        assert!(matches!(
            complete_todo(&mut store, 3, now()),
            Err(TodoError::Validation(_))
        ));
        assert!(!store.todos[0].is_completed);
    }
}
