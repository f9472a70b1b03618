//! Todo API service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod storage;
pub mod todo;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::MetricsRegistry;
pub use storage::{MemoryTodoStore, PostgresTodoStore, StorageError, TodoStore};
pub use todo::{NewTodo, Todo, TodoPatch};
