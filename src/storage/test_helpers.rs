//! Shared test helpers for storage module tests.

#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::storage::models::NewBusiness;
#[cfg(test)]
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses a single-connection in-memory database so every query sees the same data.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A minimal valid business payload.
#[cfg(test)]
pub fn new_business(name: &str, category: &str) -> NewBusiness {
    NewBusiness {
        name: name.to_string(),
        category: category.to_string(),
        city: "Dubai".to_string(),
        address: "Deira, Dubai".to_string(),
        description: format!("{name} handles residence and visit visas"),
        ..Default::default()
    }
}
