//! Health aggregator service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │               HEALTH AGGREGATOR                │
//!                      │                                                │
//!   GET /health        │  ┌────────┐    ┌───────────────┐               │
//!   ───────────────────┼─▶│  http  │───▶│ HealthManager │── fan-out ──┐ │
//!                      │  │ server │    │   (check)     │             │ │
//!                      │  └────────┘    └───────┬───────┘             ▼ │
//!                      │       ▲                │ fan-in       ┌───────┐│      Dependencies
//!   200 / 503 + JSON   │       │                ▼              │probes │├────▶ (store, cache,
//!   ◀──────────────────┼───────┴──────── AggregateResponse ◀───┴───────┘│       bus, tcp)
//!                      │                                                │
//!                      │  config (TOML, hot reload) · observability     │
//!                      │  lifecycle (startup, signals, shutdown)        │
//!                      └────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use health_aggregator::config::{load_config, AppConfig, ConfigWatcher};
use health_aggregator::http::HttpServer;
use health_aggregator::lifecycle::{build_manager, signals, Shutdown};
use health_aggregator::observability::{logging, metrics};

/// Concurrent dependency health aggregator
#[derive(Parser, Debug)]
#[command(name = "health-aggregator", version, about)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter override (e.g., "health_aggregator=debug")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Reload probes when the configuration file changes
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability, args.log_level.as_deref())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "health-aggregator starting");

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let manager = build_manager(&config)?;

    // Keep the watcher alive for the life of the process.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        _ => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, manager);
    let server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
