use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the store and the note service.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note content cannot be empty")]
    EmptyContent,

    #[error("invalid date format, expected YYYY-MM-DD: {0}")]
    InvalidDateFormat(String),

    #[error("invalid month format, expected YYYY-MM: {0}")]
    InvalidMonthFormat(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode notes in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode notes: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("note {0} not found")]
    NotFound(String),

    #[error("only tasks and reminders can be completed ({0} is a {1})")]
    NotCompletable(String, &'static str),
}

impl NoteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NoteError::Io { path: path.into(), source }
    }
}

pub type Result<T, E = NoteError> = std::result::Result<T, E>;
