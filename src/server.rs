//! Server startup and shutdown.
//!
//! This module contains the `run_server` function which handles:
//! - Storage initialization and migrations
//! - Mapping service and application state creation
//! - Router creation
//! - Server binding and graceful shutdown

use crate::config::{Config, StorageBackend};
use crate::db::{MemoryRepository, PgRepository, UrlRepository};
use crate::error::{AppError, AppResult};
use crate::routes;
use crate::services::{NanoidGenerator, UrlService};
use crate::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Open the configured storage backend, running migrations if requested.
pub async fn connect_repository(
    config: &Config,
    should_migrate: bool,
) -> AppResult<Arc<dyn UrlRepository>> {
    match (config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            info!("Connecting to database...");
            let repository = PgRepository::new(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_seconds,
            )
            .await?;

            if should_migrate {
                info!("Running database migrations...");
                repository.run_migrations().await?;
                info!("Migrations completed successfully");
            }

            Ok(Arc::new(repository))
        }
        (StorageBackend::Postgres, None) => {
            Err(AppError::MissingEnvVar("DATABASE_URL".to_string()))
        }
        (StorageBackend::Memory, _) => {
            warn!("Using in-memory storage; mappings are lost on shutdown");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

/// Build the mapping service from configuration and an opened store.
pub fn build_service(config: &Config, repository: Arc<dyn UrlRepository>) -> UrlService {
    let generator = NanoidGenerator::new(config.url.short_code_length);
    info!(
        length = generator.length(),
        max_attempts = config.url.short_code_max_attempts,
        "Short code generator ready"
    );

    UrlService::new(
        repository,
        Arc::new(generator),
        config.url.short_code_max_attempts,
    )
}

/// Run the web server with the given configuration.
///
/// # Errors
///
/// This function will return an error if:
/// - Database connection fails
/// - Migration fails
/// - Server binding fails
/// - Server runtime error occurs
pub async fn run_server(config: Config, should_migrate: bool) -> AppResult<()> {
    info!("Starting linkmap server...");

    let repository = connect_repository(&config, should_migrate).await?;
    let state = Arc::new(AppState::new(build_service(&config, repository)));

    let app = routes::create_router(state, &config.server, &config.cors);

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);
    if !config.server.api_prefix.is_empty() {
        info!("API mounted under {}", config.server.api_prefix);
    }
    if let Some(dir) = &config.server.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(create_shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create a future that resolves when a shutdown signal is received.
///
/// On Unix-like systems, this listens for both Ctrl+C (SIGINT) and SIGTERM.
/// On other platforms, it only listens for Ctrl+C.
async fn create_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    ctrl_c.await;

    info!("Shutdown signal received");
}
