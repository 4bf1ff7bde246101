//! Error types for gasoo-store.

use std::path::PathBuf;

use gasoo_types::ValidationError;

/// Result type for gasoo-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gasoo-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reading payload failed validation.
    #[error("Invalid reading: {0}")]
    Validation(#[from] ValidationError),

    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid timestamp.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl Error {
    /// Whether this error was caused by the caller's input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
