use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use rempo_api::{
    blacklist::create_blacklist,
    config::{Config, ConfigValidator},
    create_router,
    database::create_database,
    observability::logging::init_logging,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env_and_file()?;

    init_logging(&config.logging)?;
    info!("Starting Rempo API...");
    info!("Configuration loaded successfully");

    for warning in ConfigValidator::security_warnings(&config) {
        warn!("{}", warning);
    }

    let database = create_database(&config.database).await?;
    let health = database.health_check().await?;
    info!(
        "User store ready: {} ({}ms)",
        health.database_type, health.response_time_ms
    );

    let blacklist = create_blacklist(&config.blacklist)?;
    info!("Token blacklist initialized");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, Arc::from(database), blacklist)?;
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
