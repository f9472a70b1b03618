//! Todo resource subsystem.
//!
//! # Data Flow
//! ```text
//! POST body  → NewTodo   ─┐
//! PATCH body → TodoPatch ─┼→ storage (TodoStore) → Todo → JSON response
//! GET/DELETE → id        ─┘
//! ```
//!
//! # Design Decisions
//! - The storage layer owns `id` and `createdAt`; request bodies cannot carry them
//! - `title` merges on update, `done` is always replaced

pub mod model;

pub use model::{NewTodo, Todo, TodoPatch};
