//! Observability core service.
//!
//! Serves the inspection API over the in-process metrics store, span store
//! and alert engine, and runs the alert monitor and span janitor until a
//! shutdown signal arrives.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /metrics, /alerts, /traces/..       ┌──────────────────────────┐
//!   ──────────────────────────────────────▶ │   http (axum server)     │
//!                                           │   admin inspection API   │
//!                                           └─────────────┬────────────┘
//!                                                         │ Telemetry
//!               ┌─────────────────────────┬───────────────┴───────────┐
//!               ▼                         ▼                           ▼
//!       ┌──────────────┐         ┌──────────────┐            ┌──────────────┐
//!       │ MetricsStore │◀────────│ AlertEngine  │            │  TraceStore  │
//!       └──────────────┘  reads  └──────▲───────┘            └──────▲───────┘
//!                                       │ tick                      │ tick
//!                                ┌──────┴───────┐            ┌──────┴───────┐
//!                                │ AlertMonitor │            │ SpanJanitor  │
//!                                └──────────────┘            └──────────────┘
//! ```

use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;

use observability_core::config::{load_config, CoreConfig};
use observability_core::lifecycle::{launch, wait_for_signal, Shutdown, SHUTDOWN_GRACE};
use observability_core::logging::init_logging;

#[derive(Parser)]
#[command(name = "observability-core")]
#[command(about = "In-process metrics, tracing and alerting service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CoreConfig::default(),
    };

    init_logging(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "observability-core starting");

    tracing::info!(
        bind_address = %config.server.bind_address,
        max_spans = config.tracing.max_spans,
        alerts_enabled = config.alerts.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _telemetry = launch(config, Router::new(), listener, &shutdown);

    wait_for_signal().await;
    shutdown.trigger();
    let finished = shutdown.wait(SHUTDOWN_GRACE).await;

    tracing::info!(tasks = finished, "Shutdown complete");
    Ok(())
}
