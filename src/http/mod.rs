//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign or propagate X-Request-ID)
//!     → observability (count, time, log)
//!     → handlers.rs (path + body → TodoStore call)
//!     → response.rs (storage outcome → status code)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id_middleware, RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
