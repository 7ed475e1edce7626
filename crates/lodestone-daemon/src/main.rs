// Lodestone daemon - note index service
//
// This daemon provides:
// - Full scan of a note tree on startup
// - Filesystem watching and change detection
// - Metadata extraction from note headers
// - Durable index synchronization in SQLite

use clap::Parser;
use lodestone_daemon::{ServiceConfig, Supervisor};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit codes for different scenarios
mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 1;
    pub const RUNTIME_ERROR: i32 = 2;
}

#[derive(Parser)]
#[command(name = "lodestone")]
#[command(about = "lodestone - note index service: scan, watch, persist")]
#[command(version)]
struct Cli {
    /// Root of the note tree to index
    #[arg(long, env = "LODESTONE_ROOT")]
    root: PathBuf,

    /// SQLite database file for the index
    #[arg(long, env = "LODESTONE_DB_PATH", default_value = "data/notes.db")]
    db_path: PathBuf,

    /// Run the initial scan and exit without watching
    #[arg(long)]
    scan_only: bool,

    /// Debounce window for filesystem events, in milliseconds
    #[arg(long, default_value = "200")]
    debounce_ms: u64,

    /// Capacity of the event queue between watcher and index
    #[arg(long, default_value = "512")]
    queue_capacity: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting lodestone v{}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::new(cli.root, cli.db_path)
        .with_scan_only(cli.scan_only)
        .with_debounce_ms(cli.debounce_ms)
        .with_queue_capacity(cli.queue_capacity);

    let config = match config.validate() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    match Supervisor::new(config).run().await {
        Ok(()) => process::exit(exit_codes::SUCCESS),
        Err(e) => {
            error!("Service failed: {:#}", e);
            process::exit(exit_codes::RUNTIME_ERROR);
        }
    }
}
