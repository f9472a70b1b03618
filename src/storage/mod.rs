//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! http handlers
//!     → TodoStore (Arc<dyn TodoStore>, chosen at startup)
//!         → memory.rs   (Mutex-guarded Vec, tests and local runs)
//!         → postgres.rs (sqlx connection pool)
//! ```
//!
//! # Design Decisions
//! - One trait, two backends, selected by configuration
//! - "No such id" is always `StorageError::NotFound`, never a silent success
//! - No retries or transactions; each call is a single statement

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, StorageBackend};
use crate::todo::{NewTodo, Todo, TodoPatch};

pub use memory::MemoryTodoStore;
pub use postgres::PostgresTodoStore;

/// Errors returned by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record with the given id exists.
    #[error("todo not found: {0}")]
    NotFound(String),

    /// The relational backend rejected or failed the query.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend could not serve the call at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The storage port every todo backend implements.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a new record. The backend assigns `id` and `created_at`,
    /// and `done` always starts out `false`.
    async fn create(&self, new: NewTodo) -> StorageResult<Todo>;

    /// Fetch one record.
    async fn get(&self, id: &str) -> StorageResult<Todo>;

    /// Fetch every live record.
    async fn get_all(&self) -> StorageResult<Vec<Todo>>;

    /// Merge `patch` into the record. Returns the affected row count (1).
    async fn update(&self, id: &str, patch: TodoPatch) -> StorageResult<u64>;

    /// Hard-delete the record. Returns the affected row count (1).
    async fn delete(&self, id: &str) -> StorageResult<u64>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Release backend resources on shutdown.
    async fn close(&self) {}
}

/// Build the store named by the configuration.
///
/// The postgres backend connects its pool and creates the table if needed.
pub async fn connect_store(config: &AppConfig) -> StorageResult<Arc<dyn TodoStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryTodoStore::new())),
        StorageBackend::Postgres => {
            tracing::info!(url = %config.database.redacted_url(), "Connecting to database");
            let store = PostgresTodoStore::connect(&config.database).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
