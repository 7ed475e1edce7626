//! Applies filesystem events to the note index.

use std::path::Path;
use std::sync::Arc;

use lodestone_core::{is_note_file, NoteExtractor, NoteStore};
use tracing::{debug, error, info};

use crate::events::{FileEvent, FileEventKind};

/// Single consumer of the watcher's event queue.
///
/// Events are applied strictly in arrival order, one at a time. Directory
/// events are skipped outright; the files inside a created or removed
/// directory produce their own events.
pub struct EventDispatcher {
    extractor: Arc<NoteExtractor>,
    store: Arc<dyn NoteStore>,
}

impl EventDispatcher {
    pub fn new(extractor: Arc<NoteExtractor>, store: Arc<dyn NoteStore>) -> Self {
        Self { extractor, store }
    }

    /// Consume events until the producer side disconnects.
    pub async fn run(self, rx: flume::Receiver<FileEvent>) {
        info!("event dispatcher started");
        while let Ok(event) = rx.recv_async().await {
            self.handle_event(event).await;
        }
        info!("event queue disconnected, dispatcher finished");
    }

    /// Apply a single event to the index.
    pub async fn handle_event(&self, event: FileEvent) {
        if event.is_dir {
            debug!(path = %event.path.display(), "ignoring directory event");
            return;
        }

        match event.kind {
            FileEventKind::Created | FileEventKind::Modified => {
                self.index(&event.path).await;
            }
            FileEventKind::Deleted => {
                self.remove(&event.path).await;
            }
            FileEventKind::Moved { ref from, ref to } => {
                // Two independent steps; each side's extension decides
                // whether its step runs.
                self.remove(from).await;
                self.index(to).await;
            }
            FileEventKind::Unknown(ref kind) => {
                debug!(path = %event.path.display(), kind, "ignoring unclassified event");
            }
        }
    }

    async fn index(&self, path: &Path) {
        if !is_note_file(path) {
            return;
        }
        let Some(record) = self.extractor.process(path) else {
            return;
        };
        let rel = record.path.clone();
        if self.store.upsert(record).await {
            info!(path = %rel, "indexed note");
        } else {
            error!(path = %rel, "failed to store note record");
        }
    }

    async fn remove(&self, path: &Path) {
        if !is_note_file(path) {
            return;
        }
        let Some(rel) = self.extractor.relative_path(path) else {
            error!(path = %path.display(), "cannot resolve path against watched root");
            return;
        };
        let rel = rel.to_string_lossy().into_owned();
        if self.store.delete(&rel).await {
            info!(path = %rel, "removed note from index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_core::NoteStatus;
    use lodestone_sqlite::{create_note_store, SqlitePool};
    use tempfile::TempDir;

    async fn setup(dir: &TempDir) -> EventDispatcher {
        let pool = SqlitePool::memory().expect("open memory store");
        let store = create_note_store(pool);
        let extractor = Arc::new(NoteExtractor::new(dir.path()));
        EventDispatcher::new(extractor, store)
    }

    fn write_note(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write note");
        path
    }

    #[tokio::test]
    async fn created_event_indexes_note() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let path = write_note(&dir, "n.md", "---\ntags: [alpha]\n---\nHello\n");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, path))
            .await;

        let record = dispatcher.store.get("n.md").await.unwrap().expect("record");
        assert_eq!(record.tags, vec!["alpha"]);
        assert_eq!(record.content, "Hello\n");
        assert_eq!(record.status, NoteStatus::Success);
    }

    #[tokio::test]
    async fn modified_event_reindexes_note() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let path = write_note(&dir, "n.md", "first\n");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, path.clone()))
            .await;
        std::fs::write(&path, "second\n").unwrap();
        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Modified, path))
            .await;

        let record = dispatcher.store.get("n.md").await.unwrap().expect("record");
        assert_eq!(record.content, "second\n");
        assert_eq!(dispatcher.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleted_event_removes_record() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let path = write_note(&dir, "n.md", "body\n");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, path.clone()))
            .await;
        assert_eq!(dispatcher.store.count().await.unwrap(), 1);

        std::fs::remove_file(&path).unwrap();
        dispatcher
            .handle_event(FileEvent::with_is_dir(FileEventKind::Deleted, path, false))
            .await;

        assert_eq!(dispatcher.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_unindexed_path_is_benign() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;

        dispatcher
            .handle_event(FileEvent::with_is_dir(
                FileEventKind::Deleted,
                dir.path().join("never-indexed.md"),
                false,
            ))
            .await;

        assert_eq!(dispatcher.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rename_moves_record_to_new_path() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let old = write_note(&dir, "old.md", "body\n");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, old.clone()))
            .await;

        let new = dir.path().join("new.md");
        std::fs::rename(&old, &new).unwrap();
        dispatcher
            .handle_event(FileEvent::new(
                FileEventKind::Moved {
                    from: old,
                    to: new.clone(),
                },
                new,
            ))
            .await;

        assert!(dispatcher.store.get("old.md").await.unwrap().is_none());
        let record = dispatcher.store.get("new.md").await.unwrap().expect("record");
        assert_eq!(record.title, "new");
        assert_eq!(dispatcher.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rename_to_unrecognized_extension_only_deletes() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let old = write_note(&dir, "n.md", "body\n");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, old.clone()))
            .await;

        let new = dir.path().join("n.txt");
        std::fs::rename(&old, &new).unwrap();
        dispatcher
            .handle_event(FileEvent::new(
                FileEventKind::Moved {
                    from: old,
                    to: new.clone(),
                },
                new,
            ))
            .await;

        assert_eq!(dispatcher.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rename_from_unrecognized_extension_only_indexes() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let old = write_note(&dir, "draft.txt", "body\n");

        let new = dir.path().join("draft.md");
        std::fs::rename(&old, &new).unwrap();
        dispatcher
            .handle_event(FileEvent::new(
                FileEventKind::Moved {
                    from: old,
                    to: new.clone(),
                },
                new,
            ))
            .await;

        assert!(dispatcher.store.get("draft.md").await.unwrap().is_some());
        assert_eq!(dispatcher.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn directory_events_are_skipped() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let sub = dir.path().join("sub.md");
        std::fs::create_dir(&sub).unwrap();

        dispatcher
            .handle_event(FileEvent::with_is_dir(FileEventKind::Created, sub, true))
            .await;

        assert_eq!(dispatcher.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_note_created_event_is_ignored() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let path = write_note(&dir, "image.png", "not markdown");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, path))
            .await;

        assert_eq!(dispatcher.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_header_is_indexed_as_error_record() {
        let dir = TempDir::new().unwrap();
        let dispatcher = setup(&dir).await;
        let path = write_note(&dir, "bad.md", "---\ntags: [unclosed\n---\nbody\n");

        dispatcher
            .handle_event(FileEvent::new(FileEventKind::Created, path))
            .await;

        let record = dispatcher.store.get("bad.md").await.unwrap().expect("record");
        assert_eq!(record.status, NoteStatus::Error);
        assert!(!record.error_message.is_empty());
    }
}
