//! Storage contract tests against a real PostgreSQL.
//!
//! Skipped unless `TODO_API_TEST_DATABASE_URL` points at a database the
//! tests may create a `todos` table in.

use sqlx::postgres::PgPoolOptions;
use todo_api::{NewTodo, PostgresTodoStore, TodoPatch, TodoStore};

async fn store() -> Option<PostgresTodoStore> {
    let url = match std::env::var("TODO_API_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TODO_API_TEST_DATABASE_URL not set, skipping");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    let store = PostgresTodoStore::new(pool);
    store.ensure_schema().await.expect("failed to create schema");
    Some(store)
}

#[tokio::test]
async fn test_postgres_happy_path() {
    let Some(store) = store().await else { return };
    let before = store.get_all().await.unwrap().len();

    let created = store.create(NewTodo::new("a newly created todo")).await.unwrap();
    assert!(!created.id.is_empty());
    assert!(!created.done);

    let fetched = store.get(&created.id).await.unwrap();
    assert_eq!(fetched.title, "a newly created todo");

    let patch = TodoPatch { title: None, done: true };
    assert_eq!(store.update(&created.id, patch).await.unwrap(), 1);

    let completed = store.get(&created.id).await.unwrap();
    assert!(completed.done);
    assert_eq!(completed.title, "a newly created todo");
    assert_eq!(completed.created_at, created.created_at);

    assert_eq!(store.get_all().await.unwrap().len(), before + 1);

    assert_eq!(store.delete(&created.id).await.unwrap(), 1);
    assert!(store.delete(&created.id).await.unwrap_err().is_not_found());
    assert!(store.get(&created.id).await.unwrap_err().is_not_found());
    assert_eq!(store.get_all().await.unwrap().len(), before);

    store.close().await;
}

#[tokio::test]
async fn test_postgres_unknown_ids() {
    let Some(store) = store().await else { return };

    assert!(store.get("1986").await.unwrap_err().is_not_found());
    let missing = uuid::Uuid::new_v4().to_string();
    assert!(store.get(&missing).await.unwrap_err().is_not_found());
    assert!(store
        .update(&missing, TodoPatch::default())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(store.delete(&missing).await.unwrap_err().is_not_found());
}
