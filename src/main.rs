// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::scoreboard_service::ScoreboardService;
use crate::application::snapshot_store::SnapshotStore;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::file_store::JsonFileStore;
use crate::infrastructure::memory_store::MemoryStore;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config().context("failed to load configuration")?;

    // Create store (infrastructure layer)
    let store: Arc<dyn SnapshotStore> = match &app_config.storage.directory {
        Some(directory) => {
            let store = JsonFileStore::new(directory);
            tracing::info!(path = %store.path().display(), "persisting scoreboard to file");
            Arc::new(store)
        }
        None => {
            tracing::info!("no storage directory configured, scoreboard kept in memory");
            Arc::new(MemoryStore::default())
        }
    };

    // Create service (application layer)
    let scoreboard_service =
        ScoreboardService::load(store, app_config.game.next_game_delay()).await;

    let state = Arc::new(AppState { scoreboard_service });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {}", app_config.server.bind_address))?;
    tracing::info!(%addr, "starting beyblade-scoreboard service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
