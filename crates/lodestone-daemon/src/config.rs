//! Runtime configuration for the index service.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Validated settings the supervisor runs with.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root of the note tree to index.
    pub root: PathBuf,

    /// SQLite database file holding the index.
    pub db_path: PathBuf,

    /// Run the initial scan and exit without watching.
    pub scan_only: bool,

    /// Debounce window for filesystem events, in milliseconds.
    pub debounce_ms: u64,

    /// Capacity of the event queue between watcher and index.
    pub queue_capacity: usize,
}

impl ServiceConfig {
    pub fn new(root: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            db_path: db_path.into(),
            scan_only: false,
            debounce_ms: 200,
            queue_capacity: 512,
        }
    }

    /// Builder-style: run the scan only, without watching
    #[must_use]
    pub fn with_scan_only(mut self, scan_only: bool) -> Self {
        self.scan_only = scan_only;
        self
    }

    /// Builder-style: set the debounce window
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Builder-style: set the queue capacity
    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Resolve and check the configured paths.
    ///
    /// Canonicalizes the root so the keys stored in the index are stable
    /// regardless of how the root was spelled on the command line, and
    /// creates the database's parent directory when it does not exist yet.
    pub fn validate(mut self) -> Result<Self> {
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("note root {} is not accessible", self.root.display()))?;
        if !root.is_dir() {
            bail!("note root {} is not a directory", root.display());
        }
        self.root = root;

        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("cannot create database directory {}", parent.display())
                })?;
            }
        }

        Ok(self)
    }
}
