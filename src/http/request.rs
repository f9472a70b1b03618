//! Request ID assignment and propagation.
//!
//! # Responsibilities
//! - Reuse the inbound `X-Request-ID` header when present
//! - Otherwise generate a UUID v4
//! - Store the value in request extensions for downstream layers and handlers
//! - Echo it on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible, it is the outermost layer
//! - Carried in per-request extensions, so concurrent requests never share it

use std::convert::Infallible;
use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation ID for a single request.
///
/// An inbound header value is kept byte for byte so it can be echoed back
/// unchanged; `as_str` is its lossy UTF-8 rendering for logs and handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    text: String,
    inbound: Option<HeaderValue>,
}

impl RequestId {
    /// A fresh random (v4) ID.
    pub fn generate() -> Self {
        Self {
            text: Uuid::new_v4().to_string(),
            inbound: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The value to send back in `X-Request-ID`.
    pub fn header_value(&self) -> Option<HeaderValue> {
        match &self.inbound {
            Some(value) => Some(value.clone()),
            None => HeaderValue::from_str(&self.text).ok(),
        }
    }

    /// The inbound header value, if it is present and non-empty.
    fn from_header(value: &HeaderValue) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(Self {
            text: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            inbound: Some(value.clone()),
        })
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Access to the request ID stored by [`request_id_middleware`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

impl RequestIdExt for Parts {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions.get::<RequestId>()
    }
}

/// Handlers can take `RequestId` directly. Outside the middleware a fresh
/// ID is generated so the value is never empty.
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.request_id().cloned().unwrap_or_else(RequestId::generate))
    }
}

/// Assign or propagate the request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(RequestId::from_header)
        .unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Some(value) = request_id.header_value() {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    /// Echoes the request ID the handler sees.
    fn app() -> Router {
        Router::new()
            .route("/todos", get(|id: RequestId| async move { id.to_string() }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn call(req: axum::http::Request<Body>) -> (StatusCode, Option<String>, String) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let header = res
            .headers()
            .get(&X_REQUEST_ID)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_preserves_inbound_id() {
        let req = axum::http::Request::builder()
            .uri("/todos")
            .header("X-Request-Id", "client-provided-id-123")
            .body(Body::empty())
            .unwrap();

        let (status, header, seen) = call(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(header.as_deref(), Some("client-provided-id-123"));
        assert_eq!(seen, "client-provided-id-123");
    }

    #[tokio::test]
    async fn test_preserves_non_ascii_inbound_id_verbatim() {
        let inbound = HeaderValue::from_bytes(b"caf\xe9-42").unwrap();
        let req = axum::http::Request::builder()
            .uri("/todos")
            .header(X_REQUEST_ID, inbound.clone())
            .body(Body::empty())
            .unwrap();

        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.headers().get(&X_REQUEST_ID), Some(&inbound));

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "caf\u{fffd}-42");
    }

    #[tokio::test]
    async fn test_generates_id_when_missing() {
        let req = axum::http::Request::builder()
            .uri("/todos")
            .body(Body::empty())
            .unwrap();

        let (_, header, seen) = call(req).await;
        let header = header.expect("X-Request-ID should be set");
        assert!(!header.is_empty());
        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(seen, header);
    }

    #[tokio::test]
    async fn test_empty_header_is_replaced() {
        let req = axum::http::Request::builder()
            .uri("/todos")
            .header(X_REQUEST_ID, "")
            .body(Body::empty())
            .unwrap();

        let (_, header, _) = call(req).await;
        assert!(!header.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_ids_differ() {
        let first = call(axum::http::Request::builder().uri("/todos").body(Body::empty()).unwrap()).await;
        let second = call(axum::http::Request::builder().uri("/todos").body(Body::empty()).unwrap()).await;

        assert_ne!(first.1, second.1);
    }

    #[tokio::test]
    async fn test_header_set_on_unmatched_routes() {
        let req = axum::http::Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();

        let (status, header, _) = call(req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(header.is_some());
    }
}
