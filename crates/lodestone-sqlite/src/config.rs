//! Configuration for the SQLite backend

use std::path::{Path, PathBuf};

/// Tuning for the SQLite connection
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path, or ":memory:" for an in-memory database
    pub path: PathBuf,

    /// Enable write-ahead logging so readers do not block the writer
    pub wal_mode: bool,

    /// How long a blocked writer waits on a lock before failing, in ms
    pub busy_timeout_ms: u32,
}

impl SqliteConfig {
    /// Config for a file-backed database with default tuning
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            wal_mode: true,
            busy_timeout_ms: 30_000,
        }
    }

    /// Config for an in-memory database (tests)
    ///
    /// WAL is pointless without a file, so it is disabled here.
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            busy_timeout_ms: 30_000,
        }
    }

    /// Builder-style: toggle WAL mode
    #[must_use]
    pub fn with_wal_mode(mut self, wal_mode: bool) -> Self {
        self.wal_mode = wal_mode;
        self
    }

    /// Builder-style: set the busy timeout
    #[must_use]
    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    /// Whether this config points at an in-memory database
    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(":memory:")
    }
}
