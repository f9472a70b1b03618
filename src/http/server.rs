//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, metrics, access log, limits, timeout)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown, bounded by a deadline

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::config::AppConfig;
use crate::http::handlers::{
    create_todo, delete_todo, get_todo, healthy, list_todos, update_todo,
};
use crate::http::request::request_id_middleware;
use crate::observability::{
    access_log_middleware, metrics_handler, metrics_middleware, MetricsRegistry,
};
use crate::storage::TodoStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub metrics: MetricsRegistry,
}

impl FromRef<AppState> for MetricsRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// HTTP server for the todo API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server over the given store and metrics registry.
    pub fn new(config: AppConfig, store: Arc<dyn TodoStore>, metrics: MetricsRegistry) -> Self {
        let state = AppState { store, metrics };
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost first: request ID, metrics, access log,
    /// body limit, timeout, then the route handler.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut routes = Router::new()
            .route("/", get(healthy))
            .route("/todos", get(list_todos).post(create_todo))
            .route(
                "/todos/{id}",
                get(get_todo).patch(update_todo).delete(delete_todo),
            );

        if config.observability.metrics_enabled {
            routes = routes.route("/metrics", get(metrics_handler));
        }

        routes.with_state(state.clone()).layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(middleware::from_fn_with_state(
                    state.metrics,
                    metrics_middleware,
                ))
                .layer(middleware::from_fn(access_log_middleware))
                .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// A clone of the fully layered router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain for at most
    /// `timeouts.shutdown_secs`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            storage = self.state.store.backend_name(),
            "HTTP server starting"
        );

        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let draining = Arc::new(Notify::new());
        let notify = draining.clone();

        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                // A dropped coordinator also means shut down.
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown requested, draining connections");
                notify.notify_one();
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => return result,
            _ = draining.notified() => {}
        }

        match tokio::time::timeout(grace, serve).await {
            Ok(result) => result?,
            Err(_) => tracing::warn!(
                timeout_secs = grace.as_secs(),
                "Shutdown deadline expired, dropping open connections"
            ),
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
