use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cineai::api::{create_router, AppState};
use cineai::config::Config;
use cineai::services::{ArtifactLoader, TmdbProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cineai=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting CineAI movie recommendation service");

    let provider = TmdbProvider::from_config(&config).context("building TMDB client")?;
    let loader = ArtifactLoader::from_config(&config).context("building artifact loader")?;

    // Initialize application state
    let state = AppState::new(loader, Arc::new(provider)).with_body_limit(config.max_body_bytes);

    if state.load().await {
        tracing::info!("Data loaded successfully, app is ready");
    } else {
        tracing::warn!("Failed to load data; app will start but functionality will be limited");
    }

    // Create the router with all routes
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
