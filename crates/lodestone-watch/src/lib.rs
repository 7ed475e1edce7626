//! Filesystem watching and scanning for the lodestone index.
//!
//! Three pieces cooperate here:
//!
//! - [`Scanner`] walks the note tree once at startup and pushes every
//!   candidate through the extractor into the store.
//! - [`NoteWatcher`] wraps the debounced notify backend and bridges its
//!   callbacks onto a bounded [`flume`] channel of typed [`FileEvent`]s.
//! - [`EventDispatcher`] is the single consumer of that channel, applying
//!   each event to the store.
//!
//! The producer never blocks: a full queue sheds the newest event with a
//! warning. Stopping the watcher disconnects the channel, which lets the
//! dispatcher drain what is already queued and then finish.

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod scanner;
pub mod watcher;

pub use dispatcher::EventDispatcher;
pub use error::{Error, Result};
pub use events::{FileEvent, FileEventKind};
pub use scanner::{ScanSummary, Scanner};
pub use watcher::{NoteWatcher, WatcherConfig};
