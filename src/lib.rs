//! visa_directory library: a UAE visa business directory service
//!
//! This library serves a directory of visa and immigration businesses with
//! user reviews and scam reports. Data lives in one of several interchangeable
//! backends (SQLite, PostgreSQL, Supabase, or a read-only static JSON export),
//! and listing reads fall back through static exports to a built-in sample so
//! the public listing is never empty. Google Places enrichment is metered by a
//! global cache-only switch.
//!
//! # Example
//!
//! ```no_run
//! use visa_directory::{run_server, BackendKind, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     backend: BackendKind::Sqlite,
//!     port: 3000,
//!     admin_password: "change-me".to_string(),
//!     ..Default::default()
//! };
//!
//! run_server(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod config;
pub mod directory;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod loader;
pub mod places;
pub mod server;
pub mod storage;

// Re-export public API
pub use config::{BackendKind, Config, LogFormat, LogLevel};
pub use directory::{Directory, Listing};
pub use export::{ExportReport, ImportReport};
pub use run::{build_state, run_export, run_import, run_server};

mod run {
    use std::path::Path;

    use anyhow::{Context, Result};
    use log::info;

    use crate::config::Config;
    use crate::directory::Directory;
    use crate::export::{export_directory, import_file, ExportReport, ImportReport};
    use crate::initialization::{connect_store, fallback_sources, init_http_client};
    use crate::loader::FallbackChain;
    use crate::places::PlacesService;
    use crate::server::{start_server, AdminAuth, AppState};

    /// Connects the configured backend and assembles the API state.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or the backend cannot be opened.
    pub async fn build_state(config: &Config) -> Result<AppState> {
        let http = init_http_client().context("Failed to initialize HTTP client")?;
        let store = connect_store(config, &http).await?;

        let chain = FallbackChain::new(fallback_sources(config));
        if !chain.source_names().is_empty() {
            info!("Fallback sources: {}", chain.source_names().join(", "));
        }

        let places = PlacesService::from_config(store.clone(), http, config);
        let auth = AdminAuth::new(&config.admin_username, &config.admin_password);
        if !auth.is_enabled() {
            log::warn!("ADMIN_PASSWORD is not set, admin login is disabled");
        }

        Ok(AppState::new(Directory::new(store, chain), places, auth))
    }

    /// Runs the API server until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Fails when startup fails or the listener cannot be bound.
    pub async fn run_server(config: Config) -> Result<()> {
        let state = build_state(&config).await?;
        info!(
            "Places: {} mode",
            if state.places.is_cache_only() {
                "cache-only"
            } else {
                "live"
            }
        );
        let addr = format!("{}:{}", config.bind_addr, config.port);
        start_server(&addr, state).await
    }

    /// Exports the configured store to static JSON files in `output_dir`.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or the files cannot be written.
    pub async fn run_export(config: &Config, output_dir: &Path) -> Result<ExportReport> {
        let http = init_http_client().context("Failed to initialize HTTP client")?;
        let store = connect_store(config, &http).await?;
        export_directory(store.as_ref(), output_dir).await
    }

    /// Imports a static JSON file into the configured store.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be parsed or the store rejects a write.
    pub async fn run_import(config: &Config, input: &Path) -> Result<ImportReport> {
        let http = init_http_client().context("Failed to initialize HTTP client")?;
        let store = connect_store(config, &http).await?;
        import_file(store.as_ref(), input).await
    }
}
