//! Error types for filekeep.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Common error type for filekeep.
#[derive(Error, Debug)]
pub enum FilekeepError {
    /// Database error.
    ///
    /// Wraps errors from the metadata store. Unique constraint violations
    /// are reported as [`FilekeepError::Duplicate`] instead.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Filesystem access denied.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Resource not found (metadata row or physical file).
    #[error("{0} not found")]
    NotFound(String),

    /// A record with the same (name, extension, path) already exists.
    #[error("already exists: {0}")]
    Duplicate(String),

    /// A resolved path falls outside the storage root.
    #[error("path escapes storage root: {0}")]
    PathEscape(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FilekeepError {
    /// Classify a filesystem error raised while operating on `path`.
    ///
    /// Access-denied errors become [`FilekeepError::Permission`]; everything
    /// else stays an I/O error.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => {
                FilekeepError::Permission(path.display().to_string())
            }
            _ => FilekeepError::Io(io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            )),
        }
    }
}

impl From<sqlx::Error> for FilekeepError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return FilekeepError::Duplicate(db_err.message().to_string());
            }
        }
        FilekeepError::Database(e.to_string())
    }
}

/// Result type alias for filekeep operations.
pub type Result<T> = std::result::Result<T, FilekeepError>;
