//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::atomic::Ordering;

use super::super::types::{AppState, RequestCounts, StatusResponse};
use crate::error_handling::RequestEvent;

/// JSON status endpoint with request and Places counters
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let stats = &state.stats;
    let response = StatusResponse {
        backend: state.directory.backend_name(),
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        requests_total: state.requests_total.load(Ordering::SeqCst),
        requests: RequestCounts {
            listings_served: stats.get(RequestEvent::ListingServed),
            fallback_served: stats.get(RequestEvent::FallbackServed),
            reviews_submitted: stats.get(RequestEvent::ReviewSubmitted),
            reports_submitted: stats.get(RequestEvent::ReportSubmitted),
            admin_logins: stats.get(RequestEvent::AdminLogin),
            admin_logins_rejected: stats.get(RequestEvent::AdminLoginRejected),
            client_errors: stats.get(RequestEvent::ClientError),
            server_errors: stats.get(RequestEvent::ServerError),
        },
        admin_sessions: state.auth.active_sessions(),
        places: state.places.snapshot(),
    };

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}
