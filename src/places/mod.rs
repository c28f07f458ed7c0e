//! Google Places integration with cost control.
//!
//! Every live call to the Places API is billed, so lookups go through
//! [`PlacesService`], which prefers cached payloads and honors a global
//! cache-only switch. While cache-only mode is on (the default) no outbound
//! request is made; uncached places are reported as blocked.

mod budget;
mod client;
mod service;
mod types;

pub use budget::PlacesBudget;
pub use client::PlacesClient;
pub use service::PlacesService;
pub use types::{PlaceDetails, PlaceLookup, PlaceOrigin, PlaceReview, PlacesUsage, SyncOutcome};
