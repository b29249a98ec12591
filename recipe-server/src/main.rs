//! Recipe Server - REST API for owner-scoped recipes, tags and ingredients
//!
//! Endpoints under /api/recipe:
//! - /recipes, /recipes/{id}, /recipes/{id}/upload-image
//! - /tags, /tags/{id}
//! - /ingredients, /ingredients/{id}

use std::net::SocketAddr;

use recipe_server::{create_router_with_state, AppState, Config};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recipe_server=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server terminated");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.socket_addr(),
        media_root = %config.media_root.display(),
        "Starting recipe-server"
    );

    let state = AppState::from_config(&config).await?;
    let app = create_router_with_state(&config, state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    // Peer addresses are needed by the rate limiter's key extractor
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
