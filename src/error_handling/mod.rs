//! Error handling and event statistics.
//!
//! This module provides:
//! - Error type definitions for initialization, storage and the Places integration
//! - Thread-safe event counters (requests served, Places calls, cache hits)
//! - The retry strategy used for outbound HTTP calls

mod stats;
mod types;

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

// Re-export public API
pub use stats::{EventCounters, PlacesStats, RequestStats};
pub use types::{
    DatabaseError, InitializationError, PlacesError, PlacesEvent, RequestEvent, StoreError,
};

/// Retry delays for transient outbound HTTP failures.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}
