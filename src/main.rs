//! carbonwatch - emissions analytics server for thermal power plants
//!
//! # Usage
//!
//! ```bash
//! # Durable store under ./data
//! cargo run --release
//!
//! # Throwaway in-memory store on another port
//! cargo run --release -- --in-memory --addr 127.0.0.1:9090
//! ```
//!
//! # Environment Variables
//!
//! - `CARBONWATCH_CONFIG`: Path to a TOML config file (default: ./carbonwatch.toml)
//! - `CARBONWATCH_CORS_ORIGINS`: Comma-separated allowed origins
//! - `RUST_LOG`: Logging level (default: info)
//! - `RESET_DB`: Set to "true" to wipe the data directory on startup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use carbonwatch::analytics::AnalyticsEngine;
use carbonwatch::api::{create_app, AppState};
use carbonwatch::config::AnalyticsConfig;
use carbonwatch::service::AnalyticsService;
use carbonwatch::storage::{AnalyticsStore, InMemoryStore, SledStore};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "carbonwatch")]
#[command(about = "Emissions analytics and optimization recommendations for thermal plants")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default from config: "0.0.0.0:8080")
    #[arg(short, long, env = "CARBONWATCH_ADDR")]
    addr: Option<String>,

    /// Override the sled data directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing survives a restart
    #[arg(long)]
    in_memory: bool,

    /// Wipe the data directory on startup. Destructive.
    /// Can also be set via RESET_DB=true.
    #[arg(long)]
    reset_db: bool,
}

/// Check if database reset is requested via CLI flag or environment variable.
fn should_reset_db(cli_flag: bool) -> bool {
    if cli_flag {
        return true;
    }
    std::env::var("RESET_DB")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn reset_data_directory(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        info!(path = %data_dir.display(), "Data directory does not exist, nothing to reset");
        return Ok(());
    }
    warn!(path = %data_dir.display(), "RESET_DB requested, removing data directory");
    std::fs::remove_dir_all(data_dir)
        .with_context(|| format!("Failed to remove data directory {}", data_dir.display()))?;
    Ok(())
}

fn open_store(args: &CliArgs, config: &AnalyticsConfig) -> Result<Arc<dyn AnalyticsStore>> {
    if args.in_memory {
        info!("Storage: in-memory (not durable)");
        return Ok(Arc::new(InMemoryStore::new()));
    }
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.storage.data_dir.clone());
    if should_reset_db(args.reset_db) {
        reset_data_directory(&data_dir)?;
    }
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let store = SledStore::open(data_dir.join("carbonwatch.sled"))
        .context("Failed to open sled store")?;
    Ok(Arc::new(store))
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let config = Arc::new(AnalyticsConfig::load());
    let addr = args.addr.clone().unwrap_or_else(|| config.server.addr.clone());
    let store = open_store(&args, &config)?;

    info!(
        addr = %addr,
        storage = store.backend_name(),
        discount_rate = config.finance.discount_rate,
        carbon_tax_per_ton = config.costs.carbon_tax_per_ton,
        "carbonwatch starting"
    );

    let service = AnalyticsService::new(AnalyticsEngine::new(Arc::clone(&config)), store);
    let app = create_app(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("carbonwatch shutdown complete");
    Ok(())
}
