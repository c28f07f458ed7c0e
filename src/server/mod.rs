//! HTTP API for the directory.
//!
//! Serves three groups of routes:
//! - `/api/...` - public listing, reviews and scam reports
//! - `/api/admin/...` - listing management and the Places toggle, behind a bearer token
//! - `/status`, `/metrics` - JSON and Prometheus counters
//!
//! CORS is permissive because the single-page frontend is hosted separately.

mod auth;
mod error;
mod handlers;
mod types;

use std::sync::atomic::Ordering;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::error_handling::RequestEvent;
use handlers::{admin, metrics_handler, public, status_handler};

pub use auth::AdminAuth;
pub use error::ApiError;
pub use types::{AppState, StatusResponse, TokenResponse};

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/logout", post(admin::logout))
        .route("/businesses", post(admin::create_business))
        .route(
            "/businesses/{id}",
            put(admin::update_business).delete(admin::delete_business),
        )
        .route("/businesses/{id}/images", post(admin::add_image))
        .route("/businesses/{id}/images/{index}", delete(admin::remove_image))
        .route("/businesses/{id}/logo", put(admin::set_logo))
        .route("/businesses/{id}/sync-places", post(admin::sync_places))
        .route(
            "/places",
            get(admin::places_usage).put(admin::set_places_mode),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ))
        .route("/login", post(admin::login));

    Router::new()
        .route("/api/health", get(public::health))
        .route("/api/businesses", get(public::list_businesses))
        .route("/api/businesses/{id}", get(public::get_business))
        .route("/api/businesses/{id}/reviews", get(public::business_reviews))
        .route("/api/categories", get(public::categories))
        .route("/api/reviews", post(public::create_review))
        .route(
            "/api/reports",
            get(public::list_reports).post(public::create_report),
        )
        .nest("/api/admin", admin_routes)
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.requests_total.fetch_add(1, Ordering::SeqCst);
    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() {
        state.stats.increment(RequestEvent::ClientError);
    } else if status.is_server_error() {
        state.stats.increment(RequestEvent::ServerError);
    }
    response
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn start_server(addr: &str, state: AppState) -> Result<(), anyhow::Error> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind API server to {}: {}", addr, e))?;

    log::info!("API server listening on http://{}/", addr);
    log::info!("  - Listing: http://{}/api/businesses", addr);
    log::info!("  - Status: http://{}/status", addr);
    log::info!("  - Metrics: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))?;

    log::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
