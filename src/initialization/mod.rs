//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - the logger
//! - the shared HTTP client (Supabase and Places)
//! - the primary storage backend and the static fallback sources

mod client;
mod logger;
mod store;

// Re-export public API
pub use client::init_http_client;
pub use logger::init_logger_with;
pub use store::{connect_store, fallback_sources};
