//! File event types and related structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Represents a file system event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEvent {
    /// Unique identifier for this event.
    pub id: Uuid,

    /// Kind of file event.
    pub kind: FileEventKind,

    /// Path to the file or directory. For moves this is the destination.
    pub path: PathBuf,

    /// Timestamp when the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Whether this is a directory.
    pub is_dir: bool,
}

impl FileEvent {
    /// Create a new file event; directory-ness is taken from the path.
    pub fn new(kind: FileEventKind, path: PathBuf) -> Self {
        let is_dir = path.is_dir();
        Self::with_is_dir(kind, path, is_dir)
    }

    /// Create a file event with an explicit directory flag.
    ///
    /// Removal events need this: a deleted path can no longer be stat'ed,
    /// so the flag has to come from the backend's event kind.
    pub fn with_is_dir(kind: FileEventKind, path: PathBuf, is_dir: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            path,
            timestamp: Utc::now(),
            is_dir,
        }
    }

    /// Get the file extension if available.
    pub fn extension(&self) -> Option<String> {
        self.path.extension()?.to_str().map(|s| s.to_lowercase())
    }
}

/// Kinds of file events that can occur.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FileEventKind {
    /// File or directory was created.
    Created,
    /// File or directory was modified.
    Modified,
    /// File or directory was deleted.
    Deleted,
    /// File or directory was moved/renamed.
    Moved {
        /// Original path before the move.
        from: PathBuf,
        /// New path after the move.
        to: PathBuf,
    },
    /// Unknown event type.
    Unknown(String),
}

impl FileEventKind {
    /// Check if this event affects file content.
    pub fn affects_content(&self) -> bool {
        matches!(self, Self::Created | Self::Modified)
    }

    /// Check if this event removes a path from the tree.
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Deleted | Self::Moved { .. })
    }

    /// Get a string representation of the event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Moved { .. } => "moved",
            Self::Unknown(_) => "unknown",
        }
    }
}
