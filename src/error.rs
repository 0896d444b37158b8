use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TodoError>;

/// Everything that can go wrong while reading or changing the todo file.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The todo file could not be opened, read, written or replaced.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A row (or the header) of the todo file is malformed. Lines are 1-based.
    #[error("malformed todo file at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// The user asked for something that makes no sense.
    #[error("{0}")]
    Validation(String),
}

impl TodoError {
    pub fn io<C: Into<String>>(context: C, source: io::Error) -> Self {
        TodoError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn parse<R: Into<String>>(line: u64, reason: R) -> Self {
        TodoError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_line() {
        let err = TodoError::parse(3, "bad boolean");
        assert_eq!(
            err.to_string(),
            "malformed todo file at line 3: bad boolean"
        );
    }

    #[test]
    fn io_error_keeps_context_and_source() {
        let err = TodoError::io(
            "Failed to open todos.csv",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to open todos.csv: denied");
        assert!(std::error::Error::source(&err).is_some());
    }
}
