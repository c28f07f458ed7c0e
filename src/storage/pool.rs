//! Database connection pool management.
//!
//! This module initializes and configures the connection pools:
//! - SQLite with WAL mode enabled and automatic database file creation
//! - PostgreSQL from a connection string (Neon or self-hosted)

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{PgPool, SqlitePool};

use crate::config::{DB_ACQUIRE_TIMEOUT, DB_MAX_CONNECTIONS};
use crate::error_handling::DatabaseError;

/// Initializes a SQLite pool for `db_path`.
///
/// Creates the database file if it doesn't exist and enables WAL mode
/// so API reads are not blocked by admin writes.
pub async fn init_sqlite_pool(db_path: &Path) -> Result<SqlitePool, DatabaseError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DatabaseError::FileCreationError(e.to_string()))?;
    }
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Database file created successfully."),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Database file already exists.")
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    // Enable WAL mode
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(pool)
}

/// Initializes a PostgreSQL pool from a connection string.
pub async fn init_postgres_pool(database_url: &str) -> Result<PgPool, DatabaseError> {
    PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {e}");
            DatabaseError::SqlError(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_sqlite_pool_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("directory.db");
        let pool = init_sqlite_pool(&path).await.unwrap();
        assert!(path.exists());

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_init_sqlite_pool_reuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("directory.db");
        init_sqlite_pool(&path).await.unwrap().close().await;
        assert!(init_sqlite_pool(&path).await.is_ok());
    }
}
