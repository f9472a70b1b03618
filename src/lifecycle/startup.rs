//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize storage and metrics in dependency order
//! - Bind the listener and serve until a shutdown signal
//! - Close storage once the server has stopped
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when storage is ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::MetricsRegistry;
use crate::storage::{connect_store, StorageError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("storage initialization failed: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Run the service until SIGINT/SIGTERM.
pub async fn serve(config: AppConfig) -> Result<(), StartupError> {
    let store = connect_store(&config).await?;
    tracing::info!(storage = store.backend_name(), "Storage ready");

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, store.clone(), MetricsRegistry::new());
    let result = server.run(listener, server_shutdown).await;

    tracing::info!(storage = store.backend_name(), "Closing storage");
    store.close().await;

    result.map_err(StartupError::Serve)
}
