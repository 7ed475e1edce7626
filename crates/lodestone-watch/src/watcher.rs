//! Debounced filesystem watching bridged onto a bounded event channel.

use std::path::PathBuf;
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{
    new_debouncer, DebounceEventResult, DebouncedEvent, Debouncer, RecommendedCache,
};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::events::{FileEvent, FileEventKind};

/// Configuration for the note watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directory tree to watch recursively.
    pub root: PathBuf,

    /// Debounce window for coalescing rapid events, in milliseconds.
    pub debounce_ms: u64,

    /// Capacity of the bounded event queue.
    pub queue_capacity: usize,
}

impl WatcherConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce_ms: 200,
            queue_capacity: 512,
        }
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
}

/// Debounced recursive watcher over the note tree.
///
/// `start` installs the notify backend and hands back the consumer side of
/// a bounded channel. `stop` tears the backend down, which disconnects the
/// producer side; events already queued stay available to the consumer.
pub struct NoteWatcher {
    config: WatcherConfig,
    debouncer: Option<Debouncer<RecommendedWatcher, RecommendedCache>>,
}

impl NoteWatcher {
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            config,
            debouncer: None,
        }
    }

    /// Start watching and return the consumer side of the event queue.
    pub fn start(&mut self) -> Result<flume::Receiver<FileEvent>> {
        if self.debouncer.is_some() {
            return Err(Error::AlreadyRunning);
        }
        if !self.config.root.is_dir() {
            return Err(Error::Config(format!(
                "watch root {} is not a directory",
                self.config.root.display()
            )));
        }

        let (tx, rx) = flume::bounded(self.config.queue_capacity);

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.config.debounce_ms),
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    for event in events {
                        if let Some(file_event) = convert_event(event) {
                            forward(&tx, file_event);
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!(error = %e, "filesystem notification error");
                    }
                }
            },
        )?;

        debouncer.watch(&self.config.root, RecursiveMode::Recursive)?;
        self.debouncer = Some(debouncer);

        info!(root = %self.config.root.display(), "watching note tree");
        Ok(rx)
    }

    /// Stop accepting notifications.
    pub fn stop(&mut self) -> Result<()> {
        match self.debouncer.take() {
            Some(debouncer) => {
                drop(debouncer);
                info!(root = %self.config.root.display(), "stopped watching note tree");
                Ok(())
            }
            None => Err(Error::NotRunning),
        }
    }

    /// Whether the backend is currently installed.
    pub fn is_running(&self) -> bool {
        self.debouncer.is_some()
    }
}

/// Enqueue one event without ever blocking the notification thread.
fn forward(tx: &flume::Sender<FileEvent>, event: FileEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(flume::TrySendError::Full(event)) => {
            warn!(
                path = %event.path.display(),
                kind = event.kind.as_str(),
                "event queue full, dropping event"
            );
        }
        Err(flume::TrySendError::Disconnected(_)) => {
            // Consumer is gone; this is the shutdown path.
        }
    }
}

/// Convert a debounced notify event into our typed event.
///
/// Renames arrive as `Modify(Name(..))`: `Both` carries source and
/// destination in one event, `From`/`To` arrive as separate halves when the
/// backend could not pair them. Access events carry nothing we index.
fn convert_event(debounced: DebouncedEvent) -> Option<FileEvent> {
    let DebouncedEvent { event, .. } = debounced;

    match event.kind {
        EventKind::Create(kind) => {
            let path = event.paths.into_iter().next()?;
            let is_dir = matches!(kind, CreateKind::Folder) || path.is_dir();
            Some(FileEvent::with_is_dir(FileEventKind::Created, path, is_dir))
        }
        EventKind::Remove(kind) => {
            let path = event.paths.into_iter().next()?;
            // The path is already gone; only the kind knows what it was.
            let is_dir = matches!(kind, RemoveKind::Folder);
            Some(FileEvent::with_is_dir(FileEventKind::Deleted, path, is_dir))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            let mut paths = event.paths.into_iter();
            let from = paths.next()?;
            let to = paths.next()?;
            let is_dir = to.is_dir();
            Some(FileEvent::with_is_dir(
                FileEventKind::Moved {
                    from,
                    to: to.clone(),
                },
                to,
                is_dir,
            ))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            let path = event.paths.into_iter().next()?;
            Some(FileEvent::with_is_dir(FileEventKind::Deleted, path, false))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            let path = event.paths.into_iter().next()?;
            Some(FileEvent::new(FileEventKind::Created, path))
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            // Unpaired rename half; resolve by whether the path survived.
            let path = event.paths.into_iter().next()?;
            if path.exists() {
                Some(FileEvent::new(FileEventKind::Created, path))
            } else {
                Some(FileEvent::with_is_dir(FileEventKind::Deleted, path, false))
            }
        }
        EventKind::Modify(_) => {
            let path = event.paths.into_iter().next()?;
            Some(FileEvent::new(FileEventKind::Modified, path))
        }
        EventKind::Access(_) => None,
        other => {
            let path = event.paths.into_iter().next()?;
            Some(FileEvent::new(
                FileEventKind::Unknown(format!("{:?}", other)),
                path,
            ))
        }
    }
}
