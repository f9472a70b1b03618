//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → metrics.rs (http_requests_total{path,method} += 1)
//!     → logging.rs (one "Completed HTTP request" event with status + duration)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`, JSON for machine parsing
//! - Request ID flows into every access log line
//! - The metrics registry is an owned value handed to the router, not a global

pub mod logging;
pub mod metrics;

pub use self::logging::{access_log_middleware, init_logging};
pub use self::metrics::{metrics_handler, metrics_middleware, MetricsRegistry};
