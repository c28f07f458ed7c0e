// storage/mod.rs
// Storage backends and the directory data model

pub mod filter;
pub mod json;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod postgres;
mod rows;
pub mod sqlite;
pub mod store;
pub mod supabase;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use json::JsonStore;
pub use migrations::{run_migrations, run_postgres_migrations};
pub use models::{
    Business, BusinessQuery, BusinessUpdate, CachedPlace, DirectorySnapshot, NewBusiness,
    NewReview, NewScamReport, Page, Review, ReviewSource, ScamReport,
};
pub use pool::{init_postgres_pool, init_sqlite_pool};
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use store::DirectoryStore;
pub use supabase::SupabaseStore;

/// Current time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
