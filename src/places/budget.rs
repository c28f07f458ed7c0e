//! Cache-only flag and call accounting for the paid Places API.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::{info, warn};

use super::types::PlacesUsage;
use crate::error_handling::{PlacesEvent, PlacesStats};

/// Global cost-control state shared by every Places lookup.
pub struct PlacesBudget {
    cache_only: AtomicBool,
    max_api_calls: Option<u64>,
    /// Calls claimed against `max_api_calls`.
    reserved: AtomicU64,
    stats: PlacesStats,
}

impl PlacesBudget {
    pub fn new(cache_only: bool, max_api_calls: Option<u64>) -> Self {
        Self {
            cache_only: AtomicBool::new(cache_only),
            max_api_calls,
            reserved: AtomicU64::new(0),
            stats: PlacesStats::new(),
        }
    }

    pub fn is_cache_only(&self) -> bool {
        self.cache_only.load(Ordering::SeqCst)
    }

    /// Turns live calls off (`true`) or on (`false`). Returns the previous value.
    pub fn set_cache_only(&self, cache_only: bool) -> bool {
        let previous = self.cache_only.swap(cache_only, Ordering::SeqCst);
        if previous != cache_only {
            info!(
                "Places cache-only mode {}",
                if cache_only { "enabled" } else { "disabled" }
            );
        }
        previous
    }

    /// Claims one billed call. Returns `false` when live calls are off or the
    /// call limit has been reached; reaching the limit switches to cache-only.
    pub fn try_begin_call(&self) -> bool {
        if self.is_cache_only() {
            return false;
        }
        if let Some(max) = self.max_api_calls {
            let claimed = self
                .reserved
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                    (used < max).then_some(used + 1)
                });
            if claimed.is_err() {
                if !self.cache_only.swap(true, Ordering::SeqCst) {
                    warn!("Places API call limit of {max} reached, switching to cache-only mode");
                }
                return false;
            }
        }
        self.stats.increment(PlacesEvent::ApiCall);
        true
    }

    pub fn record(&self, event: PlacesEvent) {
        self.stats.increment(event);
    }

    pub fn stats(&self) -> &PlacesStats {
        &self.stats
    }

    pub fn usage(&self, api_key_configured: bool) -> PlacesUsage {
        PlacesUsage {
            cache_only: self.is_cache_only(),
            api_key_configured,
            max_api_calls: self.max_api_calls,
            api_calls: self.stats.get(PlacesEvent::ApiCall),
            cache_hits: self.stats.get(PlacesEvent::CacheHit),
            blocked_calls: self.stats.get(PlacesEvent::BlockedCall),
            api_errors: self.stats.get(PlacesEvent::ApiError),
        }
    }
}
