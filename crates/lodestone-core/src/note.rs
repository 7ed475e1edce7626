//! The persisted note record and its status.
//!
//! A [`NoteRecord`] is the indexed metadata for a single note file, keyed by
//! its path relative to the watched root. The actual content lives in the
//! plaintext file; the record is a queryable projection of it. Extraction
//! failures are not dropped: they produce a record with
//! [`NoteStatus::Error`] so the index stays visibly complete.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File extensions recognized as notes (lowercase, without the dot).
pub const NOTE_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Check whether a path has a recognized note extension.
///
/// The check is case-insensitive and looks only at the path's extension, so
/// it also matches directories named like notes. Callers that need to treat
/// those differently do so downstream.
pub fn is_note_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| NOTE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

// ============================================================================
// Core Types
// ============================================================================

/// Outcome of the extraction that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    /// Metadata was extracted successfully.
    Success,
    /// Extraction failed; see `error_message`.
    Error,
}

impl NoteStatus {
    /// Stable string form used in the persisted schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Success => "success",
            NoteStatus::Error => "error",
        }
    }

    /// Parse the persisted string form back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(NoteStatus::Success),
            "error" => Some(NoteStatus::Error),
            _ => None,
        }
    }
}

/// A note record stored in the index.
///
/// `path` is the primary key: the note's path relative to the watched root.
/// `last_indexed` is assigned by the store at write time, never by the
/// producer, so it is `None` on freshly extracted records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Primary key: path relative to the watched root.
    pub path: String,

    /// Title derived from the filename stem.
    pub title: String,

    /// Relative directory of the note, empty for root-level notes.
    pub parent_folder: String,

    /// Canonicalized tags, insertion-ordered and duplicate-free.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Filesystem creation time, if the platform records one.
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,

    /// Filesystem modification time.
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,

    /// Body text with the header block stripped.
    pub content: String,

    /// Whether extraction succeeded or failed.
    pub status: NoteStatus,

    /// Failure description, empty unless `status` is [`NoteStatus::Error`].
    #[serde(default)]
    pub error_message: String,

    /// When the store last wrote this record.
    #[serde(default)]
    pub last_indexed: Option<DateTime<Utc>>,
}

impl NoteRecord {
    /// Create a new success record with minimal required fields.
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            parent_folder: String::new(),
            tags: Vec::new(),
            created_date: None,
            modified_date: None,
            content: String::new(),
            status: NoteStatus::Success,
            error_message: String::new(),
            last_indexed: None,
        }
    }

    /// Create an error record for a path whose extraction failed.
    ///
    /// All metadata fields stay empty; only the identity fields and the
    /// failure description are populated.
    pub fn error(
        path: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: NoteStatus::Error,
            error_message: message.into(),
            ..Self::new(path, title)
        }
    }

    /// Builder-style: set the parent folder
    #[must_use]
    pub fn with_parent_folder(mut self, parent_folder: impl Into<String>) -> Self {
        self.parent_folder = parent_folder.into();
        self
    }

    /// Builder-style: set tags
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builder-style: set the body content
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder-style: set the creation timestamp
    #[must_use]
    pub fn with_created_date(mut self, created: Option<DateTime<Utc>>) -> Self {
        self.created_date = created;
        self
    }

    /// Builder-style: set the modification timestamp
    #[must_use]
    pub fn with_modified_date(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.modified_date = modified;
        self
    }

    /// Check if this record represents a failed extraction.
    pub fn is_error(&self) -> bool {
        self.status == NoteStatus::Error
    }
}

// ============================================================================
// Tests
// ============================================================================
