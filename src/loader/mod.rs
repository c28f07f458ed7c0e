//! Directory loading with fallbacks.
//!
//! The public listing must never come back empty. `FallbackChain` walks an
//! ordered list of sources (typically the live database, then one or more
//! static JSON exports) and settles on the first that yields businesses. When
//! every source fails, a small built-in sample is served instead.

mod sample;

use std::sync::Arc;

use log::{info, warn};

use crate::storage::{Business, DirectoryStore};

pub use sample::sample_businesses;

/// Source name reported when the built-in sample is served.
pub const FALLBACK_SOURCE: &str = "fallback";

/// A named data source.
#[derive(Clone)]
pub struct NamedSource {
    pub name: String,
    pub store: Arc<dyn DirectoryStore>,
}

impl NamedSource {
    pub fn new(name: impl Into<String>, store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

/// Businesses together with the source that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDirectory {
    pub source: String,
    pub businesses: Vec<Business>,
}

/// Ordered sources tried until one is non-empty.
#[derive(Clone)]
pub struct FallbackChain {
    sources: Vec<NamedSource>,
    fallback: Vec<Business>,
}

impl FallbackChain {
    /// A chain ending in the built-in sample.
    pub fn new(sources: Vec<NamedSource>) -> Self {
        Self::with_fallback(sources, sample_businesses())
    }

    /// A chain ending in `fallback`. An empty `fallback` is replaced by the built-in sample.
    pub fn with_fallback(sources: Vec<NamedSource>, fallback: Vec<Business>) -> Self {
        let fallback = if fallback.is_empty() {
            sample_businesses()
        } else {
            fallback
        };
        Self { sources, fallback }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    /// Returns the first non-empty source, or the built-in sample.
    pub async fn load(&self) -> LoadedDirectory {
        for source in &self.sources {
            match source.store.all_businesses().await {
                Ok(businesses) if !businesses.is_empty() => {
                    info!(
                        "Loaded {} businesses from source '{}'",
                        businesses.len(),
                        source.name
                    );
                    return LoadedDirectory {
                        source: source.name.clone(),
                        businesses,
                    };
                }
                Ok(_) => info!("Source '{}' has no businesses, trying next", source.name),
                Err(e) => warn!("Source '{}' failed: {}. Trying next", source.name, e),
            }
        }

        warn!(
            "All {} sources empty or failing, serving built-in sample",
            self.sources.len()
        );
        LoadedDirectory {
            source: FALLBACK_SOURCE.to_string(),
            businesses: self.fallback.clone(),
        }
    }
}
