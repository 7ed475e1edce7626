//! End-to-end pipeline tests: real filesystem events flowing through the
//! watcher, dispatcher, and SQLite store.
//!
//! Filesystem notification latency varies by platform, so assertions poll
//! the store until a deadline instead of sleeping a fixed amount.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lodestone_core::{NoteExtractor, NoteRecord, NoteStore};
use lodestone_sqlite::{create_note_store, SqliteConfig, SqlitePool};
use lodestone_watch::{EventDispatcher, NoteWatcher, Scanner, WatcherConfig};
use tempfile::TempDir;

const WAIT_LIMIT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct Pipeline {
    store: Arc<dyn NoteStore>,
    watcher: NoteWatcher,
    dispatcher_task: tokio::task::JoinHandle<()>,
}

/// Scan the root, then start watching it with a short debounce.
async fn start_pipeline(root: &std::path::Path, db_path: &std::path::Path) -> Pipeline {
    let pool = SqlitePool::new(SqliteConfig::new(db_path)).expect("open database");
    let store = create_note_store(pool);
    let extractor = Arc::new(NoteExtractor::new(root));

    Scanner::new(extractor.clone(), store.clone()).scan().await;

    let mut watcher = NoteWatcher::new(WatcherConfig::new(root).with_debounce_ms(100));
    let rx = watcher.start().expect("start watcher");
    let dispatcher_task = tokio::spawn(EventDispatcher::new(extractor, store.clone()).run(rx));

    Pipeline {
        store,
        watcher,
        dispatcher_task,
    }
}

async fn shutdown(mut pipeline: Pipeline) -> Arc<dyn NoteStore> {
    pipeline.watcher.stop().expect("stop watcher");
    tokio::time::timeout(Duration::from_secs(5), pipeline.dispatcher_task)
        .await
        .expect("dispatcher drains")
        .expect("dispatcher completes");
    pipeline.store
}

async fn wait_for_record(store: &Arc<dyn NoteStore>, path: &str) -> Option<NoteRecord> {
    let deadline = Instant::now() + WAIT_LIMIT;
    while Instant::now() < deadline {
        if let Ok(Some(record)) = store.get(path).await {
            return Some(record);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    None
}

async fn wait_for_absence(store: &Arc<dyn NoteStore>, path: &str) -> bool {
    let deadline = Instant::now() + WAIT_LIMIT;
    while Instant::now() < deadline {
        if let Ok(None) = store.get(path).await {
            return true;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    false
}

#[tokio::test]
async fn scan_then_live_create_modify_delete() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("notes");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("seed.md"), "---\ntags: [seeded]\n---\nAlready here\n").unwrap();
    let db_path = dir.path().join("idx.db");

    let pipeline = start_pipeline(&root, &db_path).await;

    // The scan indexed what existed before watching began.
    let seed = pipeline.store.get("seed.md").await.unwrap().expect("seed record");
    assert_eq!(seed.tags, vec!["seeded"]);

    // A note created while watching gets picked up.
    std::fs::write(root.join("fresh.md"), "fresh body\n").unwrap();
    let fresh = wait_for_record(&pipeline.store, "fresh.md")
        .await
        .expect("fresh.md indexed");
    assert_eq!(fresh.content, "fresh body\n");

    // A modification replaces the stored record in place.
    std::fs::write(root.join("fresh.md"), "updated body\n").unwrap();
    let deadline = Instant::now() + WAIT_LIMIT;
    loop {
        let record = pipeline
            .store
            .get("fresh.md")
            .await
            .unwrap()
            .expect("fresh.md stays indexed");
        if record.content == "updated body\n" {
            break;
        }
        assert!(Instant::now() < deadline, "modification never indexed");
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    // Deleting the file removes its record.
    std::fs::remove_file(root.join("fresh.md")).unwrap();
    assert!(wait_for_absence(&pipeline.store, "fresh.md").await);

    let store = shutdown(pipeline).await;
    assert_eq!(store.count().await.unwrap(), 1);
    store.close().await.unwrap();

    // Writes after close are refused without panicking.
    assert!(!store.upsert(NoteRecord::new("late.md", "late")).await);
    assert!(store.get("late.md").await.is_err());
}

#[tokio::test]
async fn live_rename_moves_the_record() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("notes");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("old.md"), "keep this body\n").unwrap();
    let db_path = dir.path().join("idx.db");

    let pipeline = start_pipeline(&root, &db_path).await;
    assert!(pipeline.store.get("old.md").await.unwrap().is_some());

    std::fs::rename(root.join("old.md"), root.join("new.md")).unwrap();

    let moved = wait_for_record(&pipeline.store, "new.md")
        .await
        .expect("new.md indexed");
    assert_eq!(moved.title, "new");
    assert_eq!(moved.content, "keep this body\n");
    assert!(wait_for_absence(&pipeline.store, "old.md").await);

    let store = shutdown(pipeline).await;
    assert_eq!(store.count().await.unwrap(), 1);
    store.close().await.unwrap();
}

#[tokio::test]
async fn rename_out_of_note_extension_drops_the_record() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("notes");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("note.md"), "body\n").unwrap();
    let db_path = dir.path().join("idx.db");

    let pipeline = start_pipeline(&root, &db_path).await;
    assert!(pipeline.store.get("note.md").await.unwrap().is_some());

    std::fs::rename(root.join("note.md"), root.join("note.txt")).unwrap();
    assert!(wait_for_absence(&pipeline.store, "note.md").await);

    let store = shutdown(pipeline).await;
    assert_eq!(store.count().await.unwrap(), 0);
    store.close().await.unwrap();
}
