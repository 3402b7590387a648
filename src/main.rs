//! Request bridge (v1)
//!
//! Serves HTTP with Tokio and Axum, adapting every request into a
//! container request for the application delegate.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    REQUEST BRIDGE                     │
//!                     │                                                       │
//!   Client Request    │  ┌─────────┐    ┌───────────┐    ┌────────────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│  adapter  │───▶│   processor    │  │
//!                     │  │ server  │    │ uri/body  │    │     chain      │  │
//!                     │  └─────────┘    └───────────┘    └───────┬────────┘  │
//!                     │                                          │           │
//!                     │                                          ▼           │
//!   Client Response   │  ┌─────────┐                     ┌────────────────┐  │
//!   ◀─────────────────┼──│response │◀────────────────────│   application  │  │
//!                     │  │ writer  │                     │    delegate    │  │
//!                     │  └─────────┘                     └────────────────┘  │
//!                     │                                                       │
//!                     │  config · observability · lifecycle                   │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use request_bridge::adapter::{EchoDelegate, RequestAdapter};
use request_bridge::config::{load_config, validation::validate_config, BridgeConfig, ConfigError};
use request_bridge::http::HttpServer;
use request_bridge::lifecycle::{signals::shutdown_on_signal, Shutdown};
use request_bridge::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "request-bridge")]
#[command(about = "Adapts inbound HTTP requests for an application delegate", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("request-bridge v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_size = config.adapter.max_body_size,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let adapter = Arc::new(RequestAdapter::new(&config.adapter, Arc::new(EchoDelegate)));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_on_signal(&signal_shutdown).await;
    });

    HttpServer::new(config, adapter).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
