//! Route handlers for the todo resource.
//!
//! Each handler turns a verb + path + body into one storage call and maps
//! the outcome onto a status code. Bodies are parsed by hand from raw bytes
//! so a malformed payload is always a 400, whatever its content type.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::http::request::RequestId;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::storage::StorageError;
use crate::todo::{NewTodo, Todo, TodoPatch};

/// `GET /`
pub async fn healthy() -> StatusCode {
    StatusCode::OK
}

/// `GET /todos`
pub async fn list_todos(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .store
        .get_all()
        .await
        .map_err(storage_failure(&request_id, "get_all"))?;
    Ok(Json(todos))
}

/// `GET /todos/{id}`
pub async fn get_todo(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state
        .store
        .get(&id)
        .await
        .map_err(storage_failure(&request_id, "get"))?;
    Ok(Json(todo))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let new: NewTodo = parse_body(&body)?;
    if new.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }

    let todo = state
        .store
        .create(new)
        .await
        .map_err(storage_failure(&request_id, "create"))?;

    tracing::debug!(request_id = %request_id, id = %todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `PATCH /todos/{id}`
pub async fn update_todo(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let patch: TodoPatch = parse_body(&body)?;
    state
        .store
        .update(&id, patch)
        .await
        .map_err(storage_failure(&request_id, "update"))?;
    Ok(StatusCode::OK)
}

/// `DELETE /todos/{id}`
pub async fn delete_todo(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(&id)
        .await
        .map_err(storage_failure(&request_id, "delete"))?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))
}

/// Log backend failures against the request before they become a 500.
fn storage_failure<'a>(
    request_id: &'a RequestId,
    operation: &'static str,
) -> impl FnOnce(StorageError) -> ApiError + 'a {
    move |err| {
        if !err.is_not_found() {
            tracing::error!(
                request_id = %request_id,
                operation,
                error = %err,
                "Storage operation failed"
            );
        }
        err.into()
    }
}
