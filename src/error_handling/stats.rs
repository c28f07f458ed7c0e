//! Event statistics tracking.
//!
//! Thread-safe counters keyed by an event enum. Every variant of the enum is
//! registered at construction, so increments never allocate or lock.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;

use super::types::{PlacesEvent, RequestEvent};

/// Atomic counters for every variant of `E`.
///
/// Shared across handlers and tasks behind an `Arc`.
pub struct EventCounters<E>
where
    E: IntoEnumIterator + Hash + Eq + Copy + Debug,
{
    counters: HashMap<E, AtomicUsize>,
}

/// Counters for the API server.
pub type RequestStats = EventCounters<RequestEvent>;

/// Counters for the Places cost control.
pub type PlacesStats = EventCounters<PlacesEvent>;

impl<E> EventCounters<E>
where
    E: IntoEnumIterator + Hash + Eq + Copy + Debug,
{
    pub fn new() -> Self {
        let counters = E::iter().map(|e| (e, AtomicUsize::new(0))).collect();
        EventCounters { counters }
    }

    /// Increment the counter for `event`.
    pub fn increment(&self, event: E) {
        if let Some(counter) = self.counters.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map",
                event
            );
        }
    }

    /// Get the count for `event`.
    pub fn get(&self, event: E) -> usize {
        self.counters
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Sum over every event.
    pub fn total(&self) -> usize {
        E::iter().map(|e| self.get(e)).sum()
    }
}

impl<E> Default for EventCounters<E>
where
    E: IntoEnumIterator + Hash + Eq + Copy + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
