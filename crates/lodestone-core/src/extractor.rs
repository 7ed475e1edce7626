//! Metadata extraction: one file on disk in, one [`NoteRecord`] out.
//!
//! The extractor is total at its public boundary. `process` returns `None`
//! only for paths that are not notes at all; every recognized note yields a
//! record, with failures captured as error records instead of propagating.
//! That keeps the invariant that a note on disk always has a visible
//! counterpart in the index once processing has touched it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;

use crate::header::{collect_tags, parse_header, split_header, NoteHeader};
use crate::note::{is_note_file, NoteRecord};

/// Errors from a single extraction attempt.
///
/// These never cross the `process` boundary; they become the
/// `error_message` of an error record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header block: {0}")]
    Header(#[from] serde_yaml::Error),

    #[error("path is outside the watched root: {}", path.display())]
    OutsideRoot { path: PathBuf },
}

/// Result alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Turns note files into [`NoteRecord`]s, bound to a watched root.
///
/// The root should be canonical so that the absolute paths delivered by the
/// watch backend strip cleanly into relative record keys.
#[derive(Debug, Clone)]
pub struct NoteExtractor {
    root: PathBuf,
}

impl NoteExtractor {
    /// Create an extractor bound to the watched root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The watched root this extractor resolves paths against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute a path's key relative to the watched root.
    ///
    /// Returns `None` when the path does not live under the root.
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(Path::to_path_buf)
    }

    /// Process one file into a record.
    ///
    /// Returns `None` for paths without a recognized note extension. For
    /// recognized paths this always returns a record: a success record when
    /// extraction works, an error record (with best-effort identity fields)
    /// when it does not.
    pub fn process(&self, path: &Path) -> Option<NoteRecord> {
        if !is_note_file(path) {
            return None;
        }

        match self.extract(path) {
            Ok(record) => Some(record),
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to extract note metadata");
                Some(self.error_record(path, &err))
            }
        }
    }

    fn extract(&self, path: &Path) -> ExtractResult<NoteRecord> {
        let rel_path = self
            .relative_path(path)
            .ok_or_else(|| ExtractError::OutsideRoot {
                path: path.to_path_buf(),
            })?;

        let raw = fs::read_to_string(path)?;
        let stat = fs::metadata(path)?;

        // Creation time is not recorded on every filesystem; fall back to
        // the modification time rather than leaving the field empty.
        let modified = stat.modified().ok().map(DateTime::<Utc>::from);
        let created = stat
            .created()
            .or_else(|_| stat.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        let (header_src, body) = split_header(&raw);
        let header = match header_src {
            Some(src) => parse_header(src)?,
            None => NoteHeader::default(),
        };
        let tags = collect_tags(&header);

        let title = Self::title_of(path);
        let parent_folder = rel_path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(NoteRecord::new(rel_path.to_string_lossy(), title)
            .with_parent_folder(parent_folder)
            .with_tags(tags)
            .with_created_date(created)
            .with_modified_date(modified)
            .with_content(body))
    }

    /// Build the error record for a failed extraction, keeping the relative
    /// path when it can be computed and the raw path otherwise.
    fn error_record(&self, path: &Path, err: &ExtractError) -> NoteRecord {
        let key = self
            .relative_path(path)
            .unwrap_or_else(|| path.to_path_buf());

        NoteRecord::error(key.to_string_lossy(), Self::title_of(path), err.to_string())
    }

    fn title_of(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
