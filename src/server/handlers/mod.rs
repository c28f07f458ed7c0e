//! API HTTP handlers.

pub mod admin;
mod metrics;
pub mod public;
mod status;

pub use metrics::metrics_handler;
pub use status::status_handler;
