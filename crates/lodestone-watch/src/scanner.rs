//! Full-tree scan that seeds the index before watching begins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lodestone_core::{is_note_file, NoteExtractor, NoteStatus, NoteStore};
use tracing::{info, warn};

/// Outcome counters for one full scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Notes extracted and stored successfully.
    pub processed: usize,

    /// Candidates that produced an error record or failed to store.
    pub errors: usize,

    /// All note candidates found in the tree.
    pub total: usize,
}

/// Walks the note tree and upserts every candidate it finds.
///
/// Candidates are visited in sorted path order so repeated scans of the
/// same tree report progress in a stable order.
pub struct Scanner {
    extractor: Arc<NoteExtractor>,
    store: Arc<dyn NoteStore>,
}

impl Scanner {
    pub fn new(extractor: Arc<NoteExtractor>, store: Arc<dyn NoteStore>) -> Self {
        Self { extractor, store }
    }

    /// Scan the whole tree once and index everything that looks like a note.
    pub async fn scan(&self) -> ScanSummary {
        let root = self.extractor.root().to_path_buf();
        info!(root = %root.display(), "starting full scan");

        let mut candidates = Vec::new();
        collect_candidates(&root, &mut candidates);
        candidates.sort();

        let mut summary = ScanSummary {
            total: candidates.len(),
            ..ScanSummary::default()
        };

        for (index, path) in candidates.iter().enumerate() {
            let Some(record) = self.extractor.process(path) else {
                continue;
            };
            let failed = record.status == NoteStatus::Error;
            let stored = self.store.upsert(record).await;
            if stored && !failed {
                summary.processed += 1;
            } else {
                summary.errors += 1;
            }

            let seen = index + 1;
            if seen % 100 == 0 {
                info!(scanned = seen, total = summary.total, "scan progress");
            }
        }

        info!(
            processed = summary.processed,
            errors = summary.errors,
            total = summary.total,
            "scan complete"
        );
        summary
    }
}

/// Depth-first walk collecting every path with a note extension.
///
/// A directory whose name carries a note extension is both a candidate
/// (it will surface as an error record) and descended into.
fn collect_candidates(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if is_note_file(&path) {
            out.push(path.clone());
        }
        if path.is_dir() {
            collect_candidates(&path, out);
        }
    }
}
