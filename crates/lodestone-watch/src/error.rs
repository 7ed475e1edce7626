//! Error types for the file watching system.

use thiserror::Error;

/// Errors that can occur during watch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system watching error.
    #[error("File watching error: {0}")]
    Watch(String),

    /// Watcher is not running.
    #[error("Watcher is not running")]
    NotRunning,

    /// Watcher is already running.
    #[error("Watcher is already running")]
    AlreadyRunning,
}

/// Result type for file watching operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert notify errors to our error type.
impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err.to_string())
    }
}
