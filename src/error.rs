/// Error types for the tag/rename engine
///
/// Every fallible operation in the crate returns `Result<T>`. The
/// presentation layer maps each error onto one of the five `ErrorKind`s
/// to show a distinct notification.
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenamerError>;

#[derive(Debug, Error)]
pub enum RenamerError {
    /// Tag name is empty, blank, or cannot be rendered into a filename
    #[error("invalid tag name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Tag name collision, or photo already carrying the tag
    #[error("duplicate tag: {0}")]
    DuplicateTag(String),

    #[error("tag does not exist: {0}")]
    TagNotFound(String),

    /// Path is not tracked, or the tracked file vanished from disk
    #[error("no tracked photo at {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("catalog record could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidName,
    DuplicateTag,
    TagNotFound,
    InvalidPath,
    IoFailure,
}

impl RenamerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenamerError::InvalidName { .. } => ErrorKind::InvalidName,
            RenamerError::DuplicateTag(_) => ErrorKind::DuplicateTag,
            RenamerError::TagNotFound(_) => ErrorKind::TagNotFound,
            RenamerError::InvalidPath(_) => ErrorKind::InvalidPath,
            RenamerError::Io(_)
            | RenamerError::Persistence(_)
            | RenamerError::Serialization(_) => ErrorKind::IoFailure,
        }
    }
}

impl ErrorKind {
    /// Short heading for status messages
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::InvalidName => "Invalid tag name",
            ErrorKind::DuplicateTag => "Duplicate tag",
            ErrorKind::TagNotFound => "Unknown tag",
            ErrorKind::InvalidPath => "Photo not found",
            ErrorKind::IoFailure => "File system error",
        }
    }
}
