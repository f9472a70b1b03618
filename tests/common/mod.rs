//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use todo_api::config::{AppConfig, StorageBackend};
use todo_api::{HttpServer, MemoryTodoStore, MetricsRegistry, Shutdown};

/// A running server on an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub metrics: MetricsRegistry,
    pub client: reqwest::Client,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

/// Start the full server over an in-memory store.
pub async fn spawn_app() -> TestApp {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.listener.bind_address = "127.0.0.1:0".into();
    spawn_app_with(config).await
}

pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let metrics = MetricsRegistry::new();
    let server = HttpServer::new(config, Arc::new(MemoryTodoStore::new()), metrics.clone());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, server_shutdown));

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestApp {
        addr,
        metrics,
        client,
        shutdown,
        handle,
    }
}
