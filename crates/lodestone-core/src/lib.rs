//! Core domain types for the lodestone note index.
//!
//! This crate defines the persisted [`NoteRecord`], the typed header parser
//! that turns a note's YAML preamble into structured metadata, the
//! [`NoteExtractor`] that converts files on disk into records, and the
//! [`NoteStore`] trait that storage backends implement.
//!
//! The storage backend lives in `lodestone-sqlite`; filesystem watching and
//! scanning live in `lodestone-watch`. This crate has no I/O beyond reading
//! the files handed to the extractor.

pub mod extractor;
pub mod header;
pub mod note;
pub mod store;

pub use extractor::{ExtractError, ExtractResult, NoteExtractor};
pub use header::{collect_tags, parse_header, split_header, NoteHeader, TagValue};
pub use note::{is_note_file, NoteRecord, NoteStatus, NOTE_EXTENSIONS};
pub use store::{NoteStore, StoreError, StoreResult};
