//! Configuration types.
//!
//! This module defines the library configuration struct and the enums used for
//! command-line argument parsing.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_BIND_ADDR, DEFAULT_PORT, PLACES_BASE_URL, PLACES_CACHE_TTL_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Storage backend holding the directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Local SQLite file
    Sqlite,
    /// PostgreSQL (including Neon) via `DATABASE_URL`
    Postgres,
    /// Supabase REST API via `SUPABASE_URL` / `SUPABASE_KEY`
    Supabase,
    /// Read-only static JSON export
    Json,
}

impl BackendKind {
    /// Stable lowercase name, as reported by `/api/health`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Postgres => "postgres",
            BackendKind::Supabase => "supabase",
            BackendKind::Json => "json",
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use visa_directory::{BackendKind, Config};
/// use std::path::PathBuf;
///
/// let config = Config {
///     backend: BackendKind::Sqlite,
///     db_path: PathBuf::from("directory.db"),
///     port: 3000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Primary storage backend
    pub backend: BackendKind,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// PostgreSQL connection string
    pub database_url: Option<String>,

    /// Supabase project URL
    pub supabase_url: Option<String>,

    /// Supabase service or anon key
    pub supabase_key: Option<String>,

    /// Static JSON exports tried, in order, when the primary store has nothing.
    /// With the `json` backend the first entry is the primary store itself.
    pub static_json: Vec<PathBuf>,

    /// Address the API server binds to
    pub bind_addr: String,

    /// Port the API server listens on
    pub port: u16,

    /// Admin panel username
    pub admin_username: String,

    /// Admin panel password. Admin login is refused while this is empty.
    pub admin_password: String,

    /// Google Places API key. Without one, Places runs from cache only.
    pub places_api_key: Option<String>,

    /// Places web service base URL
    pub places_base_url: String,

    /// Start with outbound Places calls disabled
    pub places_cache_only: bool,

    /// Switch to cache-only after this many live Places calls
    pub places_max_api_calls: Option<u64>,

    /// Age in seconds after which cached place details are refreshed
    pub places_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            backend: BackendKind::Sqlite,
            db_path: PathBuf::from(DB_PATH),
            database_url: None,
            supabase_url: None,
            supabase_key: None,
            static_json: Vec::new(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            admin_username: "admin".to_string(),
            admin_password: String::new(),
            places_api_key: None,
            places_base_url: PLACES_BASE_URL.to_string(),
            places_cache_only: true,
            places_max_api_calls: None,
            places_cache_ttl_secs: PLACES_CACHE_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(BackendKind::Sqlite.as_str(), "sqlite");
        assert_eq!(BackendKind::Postgres.as_str(), "postgres");
        assert_eq!(BackendKind::Supabase.as_str(), "supabase");
        assert_eq!(BackendKind::Json.as_str(), "json");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("./visa_directory.db"));
        assert_eq!(config.port, 8080);
        assert!(config.places_cache_only);
        assert!(config.places_api_key.is_none());
        assert!(config.admin_password.is_empty());
        assert!(config.static_json.is_empty());
    }
}
