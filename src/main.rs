//! beaconscope - BLE beacon observation dashboard
//!
//! Serves derived dashboard views over stored beacon observations and
//! imports observation logs into the store.
//!
//! # Usage
//!
//! ```bash
//! # Serve the dashboard API (default command)
//! beaconscope serve --db ./data/observations.db
//!
//! # Load a JSON-lines observation log
//! beaconscope import --file scans.jsonl
//!
//! # Generate synthetic data straight into the store
//! simulation --days 14 --db ./data/observations.db
//! ```
//!
//! # Environment Variables
//!
//! - `BEACONSCOPE_CONFIG`: Path to a TOML config file
//! - `BEACONSCOPE_SERVER_ADDR`: Bind address (overridden by `--addr`)
//! - `BEACONSCOPE_CORS_ORIGINS`: Comma-separated allowed origins
//! - `RUST_LOG`: Logging level (default: info)

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use beaconscope::api::{create_app, DashboardState};
use beaconscope::config::{self, DashboardConfig};
use beaconscope::grouping::GroupingAdapter;
use beaconscope::storage::{ObservationSource, SledObservationStore};
use beaconscope::types::parse_observation_line;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "beaconscope")]
#[command(about = "BLE beacon observation analytics dashboard")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides BEACONSCOPE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sled database directory (overrides [storage] path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the dashboard API
    Serve {
        /// Override the server address
        #[arg(short, long, env = "BEACONSCOPE_SERVER_ADDR")]
        addr: Option<String>,
    },

    /// Import JSON-lines observations into the store
    Import {
        /// Observation log, one JSON object per line
        #[arg(long)]
        file: PathBuf,

        /// Records written per batch
        #[arg(long, default_value = "1000")]
        batch_size: usize,
    },
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ============================================================================
// Serve
// ============================================================================

async fn run_server(store: SledObservationStore, server_addr: &str) -> Result<()> {
    let source: Arc<dyn ObservationSource> = Arc::new(store);
    let state = DashboardState::new(GroupingAdapter::new(source), config::get().clone());
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("HTTP server listening on {}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => {
            info!("[HttpServer] Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("[HttpServer] Server error: {}", e);
            Err(anyhow::anyhow!("HTTP server error: {}", e))
        }
    }
}

// ============================================================================
// Import
// ============================================================================

/// Load a JSON-lines file into the store. Malformed lines are logged and
/// skipped; the import itself only fails on I/O or storage errors.
fn run_import(store: &SledObservationStore, file: &Path, batch_size: usize) -> Result<()> {
    let handle = std::fs::File::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let reader = std::io::BufReader::new(handle);

    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut imported = 0usize;
    let mut rejected = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", file.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_observation_line(idx + 1, &line) {
            Ok(obs) => batch.push(obs),
            Err(e) => {
                rejected += 1;
                warn!("Skipping record: {}", e);
            }
        }
        if batch.len() >= batch_size {
            imported += store.insert_batch(&batch)?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        imported += store.insert_batch(&batch)?;
    }

    info!(
        imported,
        rejected,
        total_stored = store.count(),
        "Import of {} complete",
        file.display()
    );
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let dashboard_config =
        DashboardConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config::init(dashboard_config);
    let cfg = config::get();

    let db_path = args.db.clone().unwrap_or_else(|| cfg.storage.path.clone());
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = SledObservationStore::open(&db_path)
        .with_context(|| format!("Failed to open observation store at {}", db_path.display()))?;

    // Without a subcommand clap never reads the env var, so fall back by hand
    let command = args.command.unwrap_or_else(|| SubCommand::Serve {
        addr: std::env::var("BEACONSCOPE_SERVER_ADDR").ok(),
    });

    match command {
        SubCommand::Serve { addr } => {
            let server_addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            info!(
                store = %db_path.display(),
                observations = store.count(),
                size_bytes = store.size_bytes(),
                "beaconscope starting"
            );
            run_server(store, &server_addr).await
        }
        SubCommand::Import { file, batch_size } => run_import(&store, &file, batch_size),
    }
}
