//! Courier Server - queue and topic router over HTTP
//!
//! This is the main entry point for the Courier message router.

mod api;
mod config;
mod docs;
mod error;
mod logging;
mod stream;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use crate::api::AppState;
use crate::config::{Config, ConfigSource};

#[derive(Debug, Parser)]
#[command(name = "courier", version, about = "In-memory queues and topics over HTTP")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = Config::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Logging is built from config, then installed once for the process
    let dispatch = logging::build(&config.logging);
    tracing::dispatcher::set_global_default(dispatch)
        .context("failed to install log dispatcher")?;

    match source {
        ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration"),
        ConfigSource::Defaults => warn!(
            path = %cli.config.display(),
            "Config file not found, using default configuration"
        ),
    }
    if config.logging.level_filter().is_none() {
        warn!(level = %config.logging.level, "Unknown log level, using info");
    }

    let state = AppState::new(config.delivery.clone());
    let app = api::router(state);

    let (host, port) = config.bind_addr();
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host} port {port}"))?;
    let addr = listener.local_addr()?;

    info!(
        addr = %addr,
        conduit_capacity = config.delivery.conduit_capacity,
        overflow = ?config.delivery.overflow,
        "Courier server listening"
    );
    info!("OpenAPI document: http://{addr}/api-docs/openapi.json");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Courier server stopped");
    Ok(())
}
