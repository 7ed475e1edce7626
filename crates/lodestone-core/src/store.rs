//! Storage abstraction for the note index.
//!
//! [`NoteStore`] is the seam between the pipeline and whatever durable
//! backend holds the records. The write operations (`upsert`, `delete`)
//! report failure as `false` rather than an error: the pipeline treats a
//! failed write as a logged, countable event, never as a reason to stop
//! watching. Read operations and lifecycle return proper results.

use async_trait::async_trait;
use thiserror::Error;

use crate::note::NoteRecord;

/// Errors surfaced by store read and lifecycle operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored value could not be converted to or from its column form.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store has been closed; no further operations are possible.
    #[error("store is closed")]
    Closed,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// NoteStore Trait
// ============================================================================

/// Durable keyed store of [`NoteRecord`]s.
///
/// Implementations must be `Send + Sync`; the scan task and the watch task
/// write concurrently. Each write runs in its own transaction so callers
/// never observe a partially applied record.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert or replace the record keyed by its `path`.
    ///
    /// Refreshes `last_indexed` to the current time on every call. Returns
    /// `false` on any failure (logged by the implementation), including an
    /// empty `path` and a closed store.
    async fn upsert(&self, record: NoteRecord) -> bool;

    /// Remove the record for `path`.
    ///
    /// Returns `false` when no such record exists or the delete fails;
    /// absence is logged as a benign anomaly, not an error.
    async fn delete(&self, path: &str) -> bool;

    /// Look up a single record by path.
    async fn get(&self, path: &str) -> StoreResult<Option<NoteRecord>>;

    /// Snapshot of all records, ordered by path.
    async fn list(&self) -> StoreResult<Vec<NoteRecord>>;

    /// Number of records currently stored.
    async fn count(&self) -> StoreResult<u64>;

    /// Release the backend. Idempotent; writes after close fail.
    async fn close(&self) -> StoreResult<()>;
}

// ============================================================================
// Blanket Implementations
// ============================================================================

/// Blanket implementation of NoteStore for Arc<T>
#[async_trait]
impl<T: NoteStore + ?Sized> NoteStore for std::sync::Arc<T> {
    async fn upsert(&self, record: NoteRecord) -> bool {
        (**self).upsert(record).await
    }

    async fn delete(&self, path: &str) -> bool {
        (**self).delete(path).await
    }

    async fn get(&self, path: &str) -> StoreResult<Option<NoteRecord>> {
        (**self).get(path).await
    }

    async fn list(&self) -> StoreResult<Vec<NoteRecord>> {
        (**self).list().await
    }

    async fn count(&self) -> StoreResult<u64> {
        (**self).count().await
    }

    async fn close(&self) -> StoreResult<()> {
        (**self).close().await
    }
}
