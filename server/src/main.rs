//! Backoffice Server - Main Entry Point

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use bo_server::{api, backend, config, navigation, session};

/// Interval between sweeps of expired sessions.
const SESSION_REAP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bo_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend_url,
        "Starting Backoffice Server"
    );

    let nav = navigation::load_navigation(&config)?;
    let backend = backend::BackendClient::new(&config)?;

    let sessions = session::SessionStorage::new(&config);
    session::spawn_session_reaper(sessions.clone(), SESSION_REAP_INTERVAL);

    // Build application state
    let bind_address = config.bind_address.clone();
    let state = api::AppState::new(config, sessions, backend, nav);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
