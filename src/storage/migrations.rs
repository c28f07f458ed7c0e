// storage/migrations.rs
// Database migration management

use std::path::PathBuf;

use sqlx::{PgPool, SqlitePool};

use crate::error_handling::DatabaseError;

fn migrations_dir(dialect: &str) -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("migrations")
        .join(dialect)
}

/// Runs SQLx migrations located in `migrations/sqlite`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DatabaseError> {
    let migrator = sqlx::migrate::Migrator::new(migrations_dir("sqlite").as_path()).await?;
    migrator.run(pool).await?;
    Ok(())
}

/// Runs SQLx migrations located in `migrations/postgres`.
pub async fn run_postgres_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    let migrator = sqlx::migrate::Migrator::new(migrations_dir("postgres").as_path()).await?;
    migrator.run(pool).await?;
    Ok(())
}
