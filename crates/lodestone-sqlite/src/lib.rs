//! SQLite storage backend for lodestone
//!
//! This crate provides the SQLite-based implementation of
//! [`lodestone_core::NoteStore`], holding the durable note index.
//!
//! ## Features
//!
//! - **WAL Mode**: concurrent reads while the scan and watch tasks write
//! - **Immediate transactions**: every write serializes against other
//!   writers before touching rows
//! - **Explicit close**: the pool retires its connection (checkpointing the
//!   WAL) instead of relying on drop order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lodestone_sqlite::{create_note_store, SqliteConfig, SqlitePool};
//! use lodestone_core::NoteStore;
//!
//! let pool = SqlitePool::new(SqliteConfig::new("./data/notes.db"))?;
//! let store = create_note_store(pool);
//!
//! let note = store.get("notes/example.md").await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod note_store;
pub mod schema;

// Re-exports
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use note_store::{create_note_store, SqliteNoteStore};
