//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::atomic::Ordering;

use super::super::types::AppState;
use crate::error_handling::RequestEvent;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let stats = &state.stats;
    let places = state.places.snapshot();

    let metrics = format!(
        r#"# HELP visa_directory_uptime_seconds Seconds since the server started
# TYPE visa_directory_uptime_seconds gauge
visa_directory_uptime_seconds {}

# HELP visa_directory_requests_total Total number of HTTP requests handled
# TYPE visa_directory_requests_total counter
visa_directory_requests_total {}

# HELP visa_directory_listings_total Listing requests by data source
# TYPE visa_directory_listings_total counter
visa_directory_listings_total{{source="primary"}} {}
visa_directory_listings_total{{source="fallback"}} {}

# HELP visa_directory_submissions_total Public submissions by kind
# TYPE visa_directory_submissions_total counter
visa_directory_submissions_total{{kind="review"}} {}
visa_directory_submissions_total{{kind="report"}} {}

# HELP visa_directory_admin_logins_total Admin login attempts by outcome
# TYPE visa_directory_admin_logins_total counter
visa_directory_admin_logins_total{{outcome="accepted"}} {}
visa_directory_admin_logins_total{{outcome="rejected"}} {}

# HELP visa_directory_errors_total Error responses by class
# TYPE visa_directory_errors_total counter
visa_directory_errors_total{{class="client"}} {}
visa_directory_errors_total{{class="server"}} {}

# HELP visa_directory_places_cache_only Whether live Places API calls are disabled (1) or allowed (0)
# TYPE visa_directory_places_cache_only gauge
visa_directory_places_cache_only {}

# HELP visa_directory_places_events_total Places lookups by outcome
# TYPE visa_directory_places_events_total counter
visa_directory_places_events_total{{event="api_call"}} {}
visa_directory_places_events_total{{event="cache_hit"}} {}
visa_directory_places_events_total{{event="blocked"}} {}
visa_directory_places_events_total{{event="api_error"}} {}
"#,
        state.start_time.elapsed().as_secs_f64(),
        state.requests_total.load(Ordering::SeqCst),
        stats.get(RequestEvent::ListingServed),
        stats.get(RequestEvent::FallbackServed),
        stats.get(RequestEvent::ReviewSubmitted),
        stats.get(RequestEvent::ReportSubmitted),
        stats.get(RequestEvent::AdminLogin),
        stats.get(RequestEvent::AdminLoginRejected),
        stats.get(RequestEvent::ClientError),
        stats.get(RequestEvent::ServerError),
        u8::from(places.cache_only),
        places.api_calls,
        places.cache_hits,
        places.blocked_calls,
        places.api_errors,
    );

    (StatusCode::OK, metrics).into_response()
}
