//! Service lifecycle: scan, watch, dispatch, shut down in order.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lodestone_core::{NoteExtractor, NoteStore};
use lodestone_sqlite::{create_note_store, SqliteConfig, SqlitePool};
use lodestone_watch::{EventDispatcher, NoteWatcher, Scanner, WatcherConfig};
use tracing::{error, info, warn};

use crate::config::ServiceConfig;

/// Owns the pipeline from filesystem to index.
///
/// Shutdown is ordered: the watcher stops first so no new events arrive,
/// the dispatcher then drains the queue within a grace period, and the
/// store closes last so every drained event still lands.
pub struct Supervisor {
    config: ServiceConfig,
}

impl Supervisor {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Run the service until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let pool = SqlitePool::new(SqliteConfig::new(&self.config.db_path))
            .context("failed to open note database")?;
        let store = create_note_store(pool);

        let result = self.run_pipeline(store.clone()).await;

        // The store closes on every exit path, after the queue has drained.
        let closed = store.close().await.context("failed to close note database");
        result.and(closed)?;
        info!("shutdown complete");
        Ok(())
    }

    async fn run_pipeline(&self, store: Arc<dyn NoteStore>) -> Result<()> {
        let extractor = Arc::new(NoteExtractor::new(&self.config.root));

        let summary = Scanner::new(extractor.clone(), store.clone()).scan().await;
        let indexed = store
            .count()
            .await
            .context("failed to count indexed notes")?;
        info!(
            processed = summary.processed,
            errors = summary.errors,
            indexed,
            "initial scan finished"
        );

        if self.config.scan_only {
            return Ok(());
        }

        let mut watcher = NoteWatcher::new(
            WatcherConfig::new(&self.config.root)
                .with_debounce_ms(self.config.debounce_ms)
                .with_queue_capacity(self.config.queue_capacity),
        );
        let rx = watcher
            .start()
            .context("failed to start filesystem watcher")?;
        let dispatcher_task = tokio::spawn(EventDispatcher::new(extractor, store).run(rx));

        wait_for_shutdown_signal().await;

        // Stopping the watcher disconnects the queue's producer side; the
        // dispatcher finishes once everything already queued is applied.
        if let Err(err) = watcher.stop() {
            warn!(error = %err, "failed to stop filesystem watcher");
        }

        match tokio::time::timeout(Duration::from_secs(5), dispatcher_task).await {
            Ok(Ok(())) => info!("event dispatcher drained"),
            Ok(Err(e)) => warn!("event dispatcher panicked: {}", e),
            Err(_) => warn!("event dispatcher did not drain within timeout, aborting"),
        }

        Ok(())
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            error!(error = %err, "failed to install terminate handler");
            wait_for_interrupt().await;
            return;
        }
    };

    tokio::select! {
        _ = wait_for_interrupt() => {}
        _ = terminate.recv() => {
            info!("received terminate, shutting down");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    wait_for_interrupt().await;
}

async fn wait_for_interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for interrupt");
        return;
    }
    info!("received interrupt, shutting down");
}
