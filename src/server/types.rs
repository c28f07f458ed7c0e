//! API server state and payloads.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::auth::AdminAuth;
use crate::directory::Directory;
use crate::error_handling::RequestStats;
use crate::places::{PlacesService, PlacesUsage};

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub directory: Directory,
    pub places: Arc<PlacesService>,
    pub auth: Arc<AdminAuth>,
    pub stats: Arc<RequestStats>,
    pub requests_total: Arc<AtomicUsize>,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(directory: Directory, places: PlacesService, auth: AdminAuth) -> Self {
        Self {
            directory,
            places: Arc::new(places),
            auth: Arc::new(auth),
            stats: Arc::new(RequestStats::new()),
            requests_total: Arc::new(AtomicUsize::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of the image and logo endpoints
#[derive(Debug, Deserialize)]
pub struct UrlBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CacheOnlyBody {
    pub cache_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub business_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub places_cache_only: bool,
}

/// JSON response for `/status`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub backend: &'static str,
    pub uptime_seconds: f64,
    pub requests_total: usize,
    pub requests: RequestCounts,
    pub admin_sessions: usize,
    pub places: PlacesUsage,
}

#[derive(Debug, Serialize)]
pub struct RequestCounts {
    pub listings_served: usize,
    pub fallback_served: usize,
    pub reviews_submitted: usize,
    pub reports_submitted: usize,
    pub admin_logins: usize,
    pub admin_logins_rejected: usize,
    pub client_errors: usize,
    pub server_errors: usize,
}
