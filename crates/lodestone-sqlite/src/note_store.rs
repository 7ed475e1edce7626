//! SQLite implementation of the [`NoteStore`] trait
//!
//! Writes run inside immediate transactions so the scan task and the watch
//! task serialize at the database instead of interleaving. Write failures
//! are logged here and reported as `false` per the trait contract; only
//! reads and lifecycle propagate errors.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lodestone_core::{NoteRecord, NoteStatus, NoteStore, StoreError, StoreResult};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use tracing::{error, warn};

use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};

const NOTE_COLUMNS: &str = "path, title, parent_folder, tags, created_date, modified_date, \
                            content, status, error_message, last_indexed";

/// SQLite-backed note store
#[derive(Clone)]
pub struct SqliteNoteStore {
    pool: SqlitePool,
}

impl SqliteNoteStore {
    /// Create a store backed by the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn try_upsert(&self, record: NoteRecord) -> SqliteResult<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection_mut(|conn| {
                let tags_json = serde_json::to_string(&record.tags)
                    .map_err(|e| SqliteError::Serialization(e.to_string()))?;
                let last_indexed = Utc::now().to_rfc3339();

                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                tx.execute(
                    r#"
                    INSERT INTO notes (path, title, parent_folder, tags, created_date, modified_date, content, status, error_message, last_indexed)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ON CONFLICT(path) DO UPDATE SET
                        title = excluded.title,
                        parent_folder = excluded.parent_folder,
                        tags = excluded.tags,
                        created_date = excluded.created_date,
                        modified_date = excluded.modified_date,
                        content = excluded.content,
                        status = excluded.status,
                        error_message = excluded.error_message,
                        last_indexed = excluded.last_indexed
                    "#,
                    params![
                        record.path,
                        record.title,
                        record.parent_folder,
                        tags_json,
                        record.created_date.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
                        record.modified_date.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
                        record.content,
                        record.status.as_str(),
                        record.error_message,
                        last_indexed,
                    ],
                )?;
                tx.commit()?;

                Ok(())
            })
        })
        .await
        .map_err(|e| SqliteError::Query(format!("upsert task failed: {}", e)))?
    }

    async fn try_delete(&self, path: &str) -> SqliteResult<bool> {
        let pool = self.pool.clone();
        let path = path.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection_mut(|conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let existing: Option<String> = tx
                    .query_row("SELECT path FROM notes WHERE path = ?1", [&path], |row| {
                        row.get(0)
                    })
                    .optional()?;
                if existing.is_none() {
                    return Ok(false);
                }

                tx.execute("DELETE FROM notes WHERE path = ?1", [&path])?;
                tx.commit()?;

                Ok(true)
            })
        })
        .await
        .map_err(|e| SqliteError::Query(format!("delete task failed: {}", e)))?
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn upsert(&self, record: NoteRecord) -> bool {
        if record.path.is_empty() {
            error!("refusing to upsert a record with an empty path");
            return false;
        }

        let path = record.path.clone();
        match self.try_upsert(record).await {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path, error = %e, "failed to upsert note record");
                false
            }
        }
    }

    async fn delete(&self, path: &str) -> bool {
        if path.is_empty() {
            error!("refusing to delete a record with an empty path");
            return false;
        }

        match self.try_delete(path).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(path = %path, "no indexed record to delete");
                false
            }
            Err(e) => {
                error!(path = %path, error = %e, "failed to delete note record");
                false
            }
        }
    }

    async fn get(&self, path: &str) -> StoreResult<Option<NoteRecord>> {
        let pool = self.pool.clone();
        let path = path.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM notes WHERE path = ?1",
                    NOTE_COLUMNS
                ))?;
                let record = stmt.query_row([&path], row_to_record).optional()?;
                Ok(record)
            })
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn list(&self) -> StoreResult<Vec<NoteRecord>> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM notes ORDER BY path",
                    NOTE_COLUMNS
                ))?;
                let rows = stmt.query_map([], row_to_record)?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                Ok(records)
            })
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn count(&self) -> StoreResult<u64> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
                Ok(count as u64)
            })
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn close(&self) -> StoreResult<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || pool.close())
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .map_err(Into::into)
    }
}

/// Wire a pool into a trait object the pipeline can share
pub fn create_note_store(pool: SqlitePool) -> Arc<dyn NoteStore> {
    Arc::new(SqliteNoteStore::new(pool))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<NoteRecord> {
    let tags_json: String = row.get(3)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let status_str: String = row.get(7)?;
    let status = NoteStatus::parse(&status_str).unwrap_or(NoteStatus::Error);

    Ok(NoteRecord {
        path: row.get(0)?,
        title: row.get(1)?,
        parent_folder: row.get(2)?,
        tags,
        created_date: parse_timestamp(&row.get::<_, String>(4)?),
        modified_date: parse_timestamp(&row.get::<_, String>(5)?),
        content: row.get(6)?,
        status,
        error_message: row.get(8)?,
        last_indexed: parse_timestamp(&row.get::<_, String>(9)?),
    })
}

/// Empty string means "unknown"; anything else must be RFC 3339
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
