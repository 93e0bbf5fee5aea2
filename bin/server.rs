// Peer Ledger - Web Server
// REST API with Axum

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use peer_ledger::api;
use peer_ledger::config::ServerConfig;
use peer_ledger::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    logging::init(&config.log, "info");

    // Seeding must finish before the listener accepts anything
    let ledger = config
        .store
        .open_ledger()
        .with_context(|| format!("Failed to open ledger at {}", config.store.db_path.display()))?;

    let app = api::router(Arc::new(ledger));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
