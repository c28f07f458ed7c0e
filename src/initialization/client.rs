//! HTTP client initialization.

use reqwest::ClientBuilder;

use crate::config::HTTP_TIMEOUT;

/// Shared HTTP client for the Supabase backend and the Places API.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_http_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
