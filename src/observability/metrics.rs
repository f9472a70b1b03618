//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): total requests by path, method
//!
//! # Design Decisions
//! - The Prometheus recorder is owned by `MetricsRegistry` and never installed
//!   globally; counters are recorded through a local recorder
//! - Counting cannot fail and never blocks the request

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::{
    formatting::sanitize_label_value, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Prometheus text exposition content type.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Process-lifetime counter registry, cheap to clone.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests.");
        });

        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Increment `http_requests_total{path, method}`.
    pub fn record_request(&self, path: &str, method: &str) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            metrics::counter!(
                HTTP_REQUESTS_TOTAL,
                "path" => path.to_string(),
                "method" => method.to_string()
            )
            .increment(1);
        });
    }

    /// Current value of `http_requests_total{path, method}`, read back from
    /// the exposition. Zero for keys never observed.
    pub fn request_count(&self, path: &str, method: &str) -> u64 {
        let path_label = format!("path=\"{}\"", sanitize_label_value(path));
        let method_label = format!("method=\"{}\"", sanitize_label_value(method));

        self.render()
            .lines()
            .filter(|line| line.starts_with(HTTP_REQUESTS_TOTAL))
            .filter(|line| line.contains(&path_label) && line.contains(&method_label))
            .filter_map(|line| line.rsplit(' ').next())
            .filter_map(|value| value.parse::<f64>().ok())
            .map(|value| value as u64)
            .sum()
    }

    /// Render the Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Count every request by raw path and method.
pub async fn metrics_middleware(
    State(metrics): State<MetricsRegistry>,
    request: Request,
    next: Next,
) -> Response {
    metrics.record_request(request.uri().path(), request.method().as_str());
    next.run(request).await
}

/// `GET /metrics`
pub async fn metrics_handler(State(metrics): State<MetricsRegistry>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        metrics.render(),
    )
}
