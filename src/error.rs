use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum NotekeeperError {
    #[error("Note not found: {0}")]
    NotFound(Uuid),

    #[error("Validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Operation cancelled before the changes were committed")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotekeeperError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        NotekeeperError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for NotekeeperError {
    fn from(e: rusqlite::Error) -> Self {
        NotekeeperError::Storage(format!("SQLite error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, NotekeeperError>;
