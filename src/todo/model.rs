//! Todo entity and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Identifier assigned by the storage backend at creation.
    pub id: String,
    pub title: String,
    pub done: bool,
    /// Set once at creation, never updated.
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /todos`.
///
/// Only `title` is read. Client supplied `id`, `done` and `createdAt`
/// are ignored because unknown fields are skipped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub title: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

/// Body of `PATCH /todos/{id}`.
///
/// `done` has no "unset" representation on the wire: a missing field
/// deserializes to `false` and overwrites the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub done: bool,
}

impl TodoPatch {
    /// The replacement title, if the patch carries a non-empty one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Apply merge-on-update semantics to an existing record.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = self.title() {
            todo.title = title.to_string();
        }
        todo.done = self.done;
    }
}
