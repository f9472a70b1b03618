//! Error to response mapping.
//!
//! # Design Decisions
//! - Not found is a bare 404, no body
//! - Client mistakes are 400 with a JSON `{"error": ...}` body
//! - Storage failures are 500; the detail goes to the log, not the client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Storage(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: &msg })).into_response()
            }
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "internal storage error",
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err: ApiError = StorageError::NotFound("1".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_backend_failure_maps_to_500() {
        let err: ApiError = StorageError::Unavailable("down".into()).into();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let res = ApiError::BadRequest("title is required".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
