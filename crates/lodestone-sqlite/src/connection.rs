//! SQLite connection management
//!
//! Uses a simple Arc<Mutex<Option<Connection>>> pattern: clones share one
//! connection, and `close()` retires it so every clone observes the closed
//! state instead of racing a dropped handle.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Thread-safe SQLite connection wrapper
///
/// For SQLite in WAL mode, we can have multiple readers but only one writer.
/// A mutex serializes access; the slot is `None` once the pool is closed.
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Option<Connection>>>,
    config: SqliteConfig,
}

impl SqlitePool {
    /// Open a connection with the given configuration and apply the schema
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        info!(path = ?config.path, "Opening SQLite database");

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            // Ensure parent directory exists
            if let Some(parent) = config.path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SqliteError::Connection(format!("Failed to create directory: {}", e))
                })?;
            }
            Connection::open(&config.path)?
        };

        let pool = Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            config,
        };

        // Configure and apply schema
        pool.initialize()?;

        Ok(pool)
    }

    /// Create an in-memory pool for testing
    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    /// Execute a closure with the connection
    pub fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.conn.lock();
        match conn.as_ref() {
            Some(conn) => f(conn),
            None => Err(SqliteError::Closed),
        }
    }

    /// Execute a closure with mutable access to the connection
    pub fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        let mut conn = self.conn.lock();
        match conn.as_mut() {
            Some(conn) => f(conn),
            None => Err(SqliteError::Closed),
        }
    }

    /// Whether the pool still holds a live connection
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Close the connection, checkpointing the WAL first.
    ///
    /// Operations on this pool or any clone fail with
    /// [`SqliteError::Closed`] afterwards. Closing twice is a no-op.
    pub fn close(&self) -> SqliteResult<()> {
        let mut slot = self.conn.lock();
        let Some(conn) = slot.take() else {
            return Ok(());
        };

        if self.config.wal_mode {
            if let Err(e) = conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);") {
                warn!(error = %e, "WAL checkpoint failed during close");
            }
        }

        info!("SQLite database closed");
        Ok(())
    }

    /// Initialize the database (configure pragmas and apply schema)
    fn initialize(&self) -> SqliteResult<()> {
        self.with_connection(|conn| {
            self.configure_pragmas(conn)?;
            schema::apply_migrations(conn)?;

            info!("SQLite database initialized successfully");
            Ok(())
        })
    }

    /// Configure SQLite PRAGMA settings
    fn configure_pragmas(&self, conn: &Connection) -> SqliteResult<()> {
        debug!("Configuring SQLite pragmas");

        // WAL mode for better concurrency
        if self.config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        }

        // Busy timeout so a blocked writer retries instead of failing
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};",
            self.config.busy_timeout_ms
        ))?;

        // Use memory for temp tables
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;

        Ok(())
    }
}
