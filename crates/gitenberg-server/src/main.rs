//! HTTP adapter between a content host and a GitHub repository of markdown files.
//!
//! This server:
//! - Lists the markdown files of the configured repository directory
//! - Serves posts with their linked remote file overlaid on the body
//! - Pushes post bodies back to GitHub on publish-related status transitions
//! - Stores repository settings, shadowed by deployment-level overrides

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use gitenberg_core::{ConfigResolver, MemoryPostStore, MemorySettingsStore, SyncEngine};
use gitenberg_github::GitHubContentClient;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod handlers;

use config::Config;
use handlers::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("Starting gitenberg-server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Host: {}", config.host);
    info!("  Port: {}", config.port);
    info!("  GitHub API: {}", config.github_api_url);
    info!("  GitHub read timeout: {}s", config.github_timeout_secs);

    let settings = Arc::new(MemorySettingsStore::new());
    let posts = Arc::new(MemoryPostStore::new());
    let resolver = Arc::new(ConfigResolver::new(config.overrides(), settings));

    // Stateless client, credentials come from the resolved config per call
    let github = Arc::new(
        GitHubContentClient::with_base_url(config.github_api_url.clone())
            .with_read_timeout(Duration::from_secs(config.github_timeout_secs)),
    );

    let engine = Arc::new(SyncEngine::new(resolver, posts.clone(), github));

    match engine.admin_notice().await {
        Some(notice) => warn!("  Sync: DISABLED ({})", notice),
        None => info!("  Sync: enabled"),
    }

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState { engine, posts })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Bind and serve
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, initiating shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, initiating shutdown");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
