//! Contact API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http::server ──▶ http::dispatch            │
//!                           │   (layers: id,      │  GET  → store.search   │
//!                           │    trace, timeout,  │  POST → validate ─┐    │
//!                           │    body limit)      │  PUT  → validate ─┤    │
//!                           │                     │  DEL  ────────────┤    │
//!                           │                     ▼                   ▼    │
//!     Client Response       │   http::response ◀── contacts::store (JSON)  │
//!     ◀─────────────────────┼── {status, data|message}                     │
//!                           │                                              │
//!                           │   config · observability · lifecycle         │
//!                           └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use contact_api::config::{load_config, ApiConfig};
use contact_api::http::HttpServer;
use contact_api::lifecycle::{signals, Shutdown};
use contact_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "contact-api")]
#[command(about = "HTTP API for managing contacts", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ApiConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!("contact-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        data_path = ?config.storage.data_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
