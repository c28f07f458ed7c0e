//! Storage backend selection.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{BackendKind, Config, ENV_DATABASE_URL, ENV_SUPABASE_KEY, ENV_SUPABASE_URL};
use crate::error_handling::InitializationError;
use crate::loader::NamedSource;
use crate::storage::{
    init_postgres_pool, init_sqlite_pool, run_migrations, run_postgres_migrations,
    DirectoryStore, JsonStore, PostgresStore, SqliteStore, SupabaseStore,
};

/// Opens the configured primary backend, running migrations for the SQL ones.
///
/// # Errors
///
/// Fails when a required setting is missing or the backend cannot be reached.
pub async fn connect_store(
    config: &Config,
    http: &reqwest::Client,
) -> Result<Arc<dyn DirectoryStore>> {
    let store: Arc<dyn DirectoryStore> = match config.backend {
        BackendKind::Sqlite => {
            let pool = init_sqlite_pool(&config.db_path)
                .await
                .context("Failed to initialize database pool")?;
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Using SQLite database at {}", config.db_path.display());
            Arc::new(SqliteStore::new(pool))
        }
        BackendKind::Postgres => {
            let url = required(config.database_url.as_deref(), config.backend, ENV_DATABASE_URL)?;
            let pool = init_postgres_pool(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            run_postgres_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Using PostgreSQL database");
            Arc::new(PostgresStore::new(pool))
        }
        BackendKind::Supabase => {
            let url = required(config.supabase_url.as_deref(), config.backend, ENV_SUPABASE_URL)?;
            let key = required(config.supabase_key.as_deref(), config.backend, ENV_SUPABASE_KEY)?;
            let store = SupabaseStore::new(http.clone(), url, key)
                .context("Failed to configure Supabase backend")?;
            info!("Using Supabase project at {url}");
            Arc::new(store)
        }
        BackendKind::Json => {
            let path = config.static_json.first().ok_or(
                InitializationError::MissingSettingError {
                    backend: BackendKind::Json.as_str(),
                    setting: "--static-json",
                },
            )?;
            let store = JsonStore::open(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            info!("Serving read-only directory from {}", path.display());
            Arc::new(store)
        }
    };
    Ok(store)
}

/// Static exports for the fallback chain. With the JSON backend the first path
/// is the primary store and is not repeated here. Unreadable files are skipped.
pub fn fallback_sources(config: &Config) -> Vec<NamedSource> {
    let skip = usize::from(config.backend == BackendKind::Json);
    config
        .static_json
        .iter()
        .skip(skip)
        .filter_map(|path| open_source(path))
        .collect()
}

fn open_source(path: &Path) -> Option<NamedSource> {
    match JsonStore::open(path) {
        Ok(store) => Some(NamedSource::new(path.display().to_string(), Arc::new(store))),
        Err(e) => {
            warn!("Skipping fallback source {}: {}", path.display(), e);
            None
        }
    }
}

fn required<'a>(
    value: Option<&'a str>,
    backend: BackendKind,
    setting: &'static str,
) -> Result<&'a str, InitializationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(InitializationError::MissingSettingError {
            backend: backend.as_str(),
            setting,
        })
}
