//! Command-line options.
//!
//! Every option that carries a credential or a deployment-specific setting can
//! also be supplied through the environment (or a `.env` file), so the same
//! binary runs locally against SQLite and in production against Postgres or
//! Supabase without flag changes.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::constants::{
    DB_PATH, DEFAULT_BIND_ADDR, DEFAULT_PORT, ENV_DATABASE_URL, ENV_GOOGLE_PLACES_API_KEY,
    ENV_STORAGE_BACKEND, ENV_SUPABASE_KEY, ENV_SUPABASE_URL, PLACES_BASE_URL,
};
use crate::config::types::{BackendKind, Config, LogFormat, LogLevel};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "visa_directory",
    version,
    about = "UAE visa business directory: API server, static export and import"
)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the JSON API server
    Serve(ServeArgs),
    /// Write the directory to static JSON files
    Export(ExportArgs),
    /// Load a static JSON export into the configured store
    Import(ImportArgs),
}

/// Storage selection shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Storage backend
    #[arg(long, value_enum, env = ENV_STORAGE_BACKEND, default_value_t = BackendKind::Sqlite)]
    pub backend: BackendKind,

    /// SQLite database path
    #[arg(long, env = "DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// PostgreSQL connection string (Neon or self-hosted)
    #[arg(long, env = ENV_DATABASE_URL, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Supabase project URL
    #[arg(long, env = ENV_SUPABASE_URL)]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = ENV_SUPABASE_KEY, hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Static JSON export(s) used as fallback sources, in order
    #[arg(long = "static-json", env = "STATIC_JSON_PATHS", value_delimiter = ',')]
    pub static_json: Vec<PathBuf>,
}

impl StoreArgs {
    fn apply(&self, config: &mut Config) {
        config.backend = self.backend;
        config.db_path = self.db_path.clone();
        config.database_url = self.database_url.clone();
        config.supabase_url = self.supabase_url.clone();
        config.supabase_key = self.supabase_key.clone();
        config.static_json = self.static_json.clone();
    }
}

/// Options for `serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Admin panel username
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Admin panel password (admin login is disabled when empty)
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, default_value = "")]
    pub admin_password: String,

    /// Google Places API key
    #[arg(long, env = ENV_GOOGLE_PLACES_API_KEY, hide_env_values = true)]
    pub places_api_key: Option<String>,

    /// Serve Places data from cache only (no billed API calls)
    #[arg(long, env = "PLACES_CACHE_ONLY", default_value_t = true, action = ArgAction::Set)]
    pub places_cache_only: bool,

    /// Switch to cache-only after this many live Places calls
    #[arg(long, env = "PLACES_MAX_API_CALLS")]
    pub places_max_api_calls: Option<u64>,

    /// Places web service base URL
    #[arg(long, env = "PLACES_BASE_URL", default_value = PLACES_BASE_URL, hide = true)]
    pub places_base_url: String,
}

/// Options for `export`.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Directory the JSON files are written to
    #[arg(long, short, default_value = "public/data")]
    pub output_dir: PathBuf,
}

/// Options for `import`.
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// JSON file to import (combined export or a bare array of businesses)
    #[arg(long, short)]
    pub input: PathBuf,
}

impl Cli {
    /// Builds the library configuration from the parsed command line.
    pub fn to_config(&self) -> Config {
        let mut config = Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            ..Default::default()
        };

        match &self.command {
            Command::Serve(args) => {
                args.store.apply(&mut config);
                config.bind_addr = args.bind.clone();
                config.port = args.port;
                config.admin_username = args.admin_username.clone();
                config.admin_password = args.admin_password.clone();
                config.places_api_key = args.places_api_key.clone();
                config.places_cache_only = args.places_cache_only;
                config.places_max_api_calls = args.places_max_api_calls;
                config.places_base_url = args.places_base_url.clone();
            }
            Command::Export(args) => args.store.apply(&mut config),
            Command::Import(args) => args.store.apply(&mut config),
        }

        config
    }
}
