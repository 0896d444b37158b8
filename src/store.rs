use csv::StringRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, TodoError};
use crate::model::Todo;

/// Columns of the todo file, in order.
pub const HEADER: [&str; 5] = [
    "todo_name",
    "tags",
    "created_at",
    "completed_at",
    "is_completed",
];

/// File used when none is given, relative to the working directory.
pub const DEFAULT_TODO_FILE: &str = "todos.csv";

/// Where todos live. Operations only ever see the whole list: they load
/// it, change it in memory and save it back.
pub trait TodoStore {
    fn load(&self) -> Result<Vec<Todo>>;
    fn save(&mut self, todos: &[Todo]) -> Result<()>;
}

/// Todos kept in a CSV file on disk.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Open the todo file, creating it with its header if it does not
    /// exist or is empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<CsvStore> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| TodoError::io(format!("Failed to open {}", path.display()), e))?;

        let size = file
            .metadata()
            .map_err(|e| TodoError::io(format!("Failed to stat {}", path.display()), e))?
            .len();

        if size == 0 {
            debug!(path = %path.display(), "initializing todo file");
            writeln!(file, "{}", HEADER.join(",")).map_err(|e| {
                TodoError::io(format!("Failed to write header to {}", path.display()), e)
            })?;
        }

        Ok(CsvStore { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl TodoStore for CsvStore {
    fn load(&self) -> Result<Vec<Todo>> {
        let file = File::open(&self.path)
            .map_err(|e| TodoError::io(format!("Failed to open {}", self.path.display()), e))?;
        let todos = read_todos(BufReader::new(file))?;
        debug!(path = %self.path.display(), count = todos.len(), "loaded todos");
        Ok(todos)
    }

    /// Write everything to a temporary file next to the todo file, then
    /// rename it over the original. Readers see either the old or the new
    /// list, never a truncated one.
    fn save(&mut self, todos: &[Todo]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.directory()).map_err(|e| {
            TodoError::io(
                format!("Failed to create a temporary file in {}", self.directory().display()),
                e,
            )
        })?;

        if let Ok(metadata) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| TodoError::io("Failed to copy todo file permissions", e))?;
        }

        write_todos(todos, &mut tmp)?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| TodoError::io("Failed to sync the temporary todo file", e))?;

        tmp.persist(&self.path).map_err(|e| {
            TodoError::io(format!("Failed to replace {}", self.path.display()), e.error)
        })?;

        debug!(path = %self.path.display(), count = todos.len(), "saved todos");
        Ok(())
    }
}

/// Todos kept in memory, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub todos: Vec<Todo>,
    pub saves: usize,
}

#[cfg(test)]
impl TodoStore for MemoryStore {
    fn load(&self) -> Result<Vec<Todo>> {
        Ok(self.todos.clone())
    }

    fn save(&mut self, todos: &[Todo]) -> Result<()> {
        self.todos = todos.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// Read a whole todo file: the header, then one todo per line.
/// Empty input is an empty list.
pub fn read_todos<R: Read>(reader: R) -> Result<Vec<Todo>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut record = StringRecord::new();
    let mut todos = Vec::new();

    if !rdr.read_record(&mut record).map_err(|e| csv_error(e, 1))? {
        return Ok(todos);
    }
    if !record.iter().eq(HEADER.iter().copied()) {
        return Err(TodoError::parse(
            line_of(&record, 1),
            format!("expected header '{}'", HEADER.join(",")),
        ));
    }
    let headers = record.clone();

    let mut line = line_of(&headers, 1);
    while rdr
        .read_record(&mut record)
        .map_err(|e| csv_error(e, line + 1))?
    {
        line = line_of(&record, line + 1);
        let todo: Todo = record
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(e, line))?;
        if todo.name.trim().is_empty() {
            return Err(TodoError::parse(line, "empty todo name"));
        }
        todos.push(todo);
    }

    Ok(todos)
}

/// Write the header and every todo, in order.
pub fn write_todos<W: Write>(todos: &[Todo], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(&HEADER).map_err(write_error)?;
    for todo in todos {
        wtr.serialize(todo).map_err(write_error)?;
    }
    wtr.flush()
        .map_err(|e| TodoError::io("Failed to write the todo file", e))?;
    Ok(())
}

fn line_of(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or(fallback)
}

fn write_error(err: csv::Error) -> TodoError {
    TodoError::io("Failed to write the todo file", io::Error::from(err))
}

fn csv_error(err: csv::Error, fallback_line: u64) -> TodoError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(fallback_line);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => TodoError::io("Failed to read the todo file", source),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => TodoError::parse(
            line,
            format!("expected {} fields, found {}", expected_len, len),
        ),
        csv::ErrorKind::Deserialize { err, .. } => TodoError::parse(line, err.to_string()),
        csv::ErrorKind::Utf8 { err, .. } => {
            TodoError::parse(line, format!("invalid UTF-8: {}", err))
        }
        other => TodoError::parse(line, format!("{:?}", other)),
    }
}
