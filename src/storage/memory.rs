//! In-memory todo store.
//!
//! Every operation takes the same mutex exactly once, so concurrent
//! requests observe a consistent sequence of records.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::storage::{StorageError, StorageResult, TodoStore};
use crate::todo::{NewTodo, Todo, TodoPatch};

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<Todo>,
    last_id: u64,
}

/// Todo store backed by a `Vec` in insertion order.
///
/// Ids are the decimal form of a counter starting at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    inner: Mutex<Inner>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, new: NewTodo) -> StorageResult<Todo> {
        let mut inner = self.lock()?;
        inner.last_id += 1;

        let todo = Todo {
            id: inner.last_id.to_string(),
            title: new.title,
            done: false,
            created_at: Utc::now(),
        };
        inner.todos.push(todo.clone());
        Ok(todo)
    }

    async fn get(&self, id: &str) -> StorageResult<Todo> {
        let inner = self.lock()?;
        inner
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn get_all(&self) -> StorageResult<Vec<Todo>> {
        Ok(self.lock()?.todos.clone())
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> StorageResult<u64> {
        let mut inner = self.lock()?;
        let todo = inner
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        patch.apply_to(todo);
        Ok(1)
    }

    async fn delete(&self, id: &str) -> StorageResult<u64> {
        let mut inner = self.lock()?;
        let index = inner
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        inner.todos.remove(index);
        Ok(1)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
