//! PostgreSQL todo store.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todos (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title TEXT NOT NULL,
//!     done BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Ids and creation timestamps come from the column defaults, so the
//! database is the single source of both.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::storage::{StorageError, StorageResult, TodoStore};
use crate::todo::{NewTodo, Todo, TodoPatch};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todos (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title TEXT NOT NULL,
    done BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: Uuid,
    title: String,
    done: bool,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id.to_string(),
            title: row.title,
            done: row.done,
            created_at: row.created_at,
        }
    }
}

/// Todo store backed by a `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct PostgresTodoStore {
    pool: PgPool,
}

impl PostgresTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against the configured database.
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        let url = config
            .connection_url()
            .map_err(|e| StorageError::Unavailable(format!("invalid database url: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url.as_str())
            .await?;

        Ok(Self::new(pool))
    }

    /// Create the `todos` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

/// Ids that are not UUIDs can never match a row.
fn parse_id(id: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StorageError::NotFound(id.to_string()))
}

#[async_trait]
impl TodoStore for PostgresTodoStore {
    async fn create(&self, new: NewTodo) -> StorageResult<Todo> {
        let row: TodoRow = sqlx::query_as(
            "INSERT INTO todos (title) VALUES ($1) RETURNING id, title, done, created_at",
        )
        .bind(&new.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: &str) -> StorageResult<Todo> {
        let uuid = parse_id(id)?;
        let row: Option<TodoRow> =
            sqlx::query_as("SELECT id, title, done, created_at FROM todos WHERE id = $1")
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Todo::from)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn get_all(&self) -> StorageResult<Vec<Todo>> {
        let rows: Vec<TodoRow> =
            sqlx::query_as("SELECT id, title, done, created_at FROM todos ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> StorageResult<u64> {
        let uuid = parse_id(id)?;
        let result = sqlx::query(
            "UPDATE todos SET title = COALESCE(NULLIF($1, ''), title), done = $2 WHERE id = $3",
        )
        .bind(patch.title())
        .bind(patch.done)
        .bind(uuid)
        .execute(&self.pool)
        .await?;

        match result.rows_affected() {
            0 => Err(StorageError::NotFound(id.to_string())),
            n => Ok(n),
        }
    }

    async fn delete(&self, id: &str) -> StorageResult<u64> {
        let uuid = parse_id(id)?;
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        match result.rows_affected() {
            0 => Err(StorageError::NotFound(id.to_string())),
            n => Ok(n),
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
