//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (pagination limits, Places API defaults, retry policy)
//! - The library `Config` struct and its enums
//! - CLI option types and their conversion into `Config`

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, ExportArgs, ImportArgs, ServeArgs, StoreArgs};
pub use constants::*;
pub use types::{BackendKind, Config, LogFormat, LogLevel};
