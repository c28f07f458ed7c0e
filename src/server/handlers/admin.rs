//! Admin endpoints. Everything except `login` sits behind `require_admin`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use log::{info, warn};

use super::super::auth::bearer_token;
use super::super::error::ApiError;
use super::super::types::{AppState, CacheOnlyBody, LoginRequest, TokenResponse, UrlBody};
use crate::error_handling::RequestEvent;
use crate::places::{PlacesUsage, SyncOutcome};
use crate::storage::{Business, BusinessUpdate, NewBusiness};

/// Rejects requests without a valid bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match bearer_token(request.headers()) {
        Some(token) if state.auth.is_valid(token) => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized),
    }
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;
    match state.auth.login(&request.username, &request.password) {
        Some(token) => {
            state.stats.increment(RequestEvent::AdminLogin);
            info!("Admin login for '{}'", request.username);
            Ok(Json(TokenResponse { token }))
        }
        None => {
            state.stats.increment(RequestEvent::AdminLoginRejected);
            warn!("Rejected admin login for '{}'", request.username);
            Err(ApiError::Unauthorized)
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token);
    }
    StatusCode::NO_CONTENT
}

pub async fn create_business(
    State(state): State<AppState>,
    payload: Result<Json<NewBusiness>, JsonRejection>,
) -> Result<(StatusCode, Json<Business>), ApiError> {
    let Json(new) = payload?;
    let business = state.directory.create_business(new).await?;
    info!("Created business {} ({})", business.id, business.name);
    Ok((StatusCode::CREATED, Json(business)))
}

pub async fn update_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BusinessUpdate>, JsonRejection>,
) -> Result<Json<Business>, ApiError> {
    let Json(update) = payload?;
    found(state.directory.update_business(&id, update).await?, &id)
}

pub async fn delete_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.directory.delete_business(&id).await? {
        info!("Deleted business {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Business '{id}'")))
    }
}

pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UrlBody>, JsonRejection>,
) -> Result<Json<Business>, ApiError> {
    let Json(body) = payload?;
    found(state.directory.add_image(&id, &body.url).await?, &id)
}

pub async fn remove_image(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
) -> Result<Json<Business>, ApiError> {
    let Path((id, index)) = path?;
    found(state.directory.remove_image(&id, index).await?, &id)
}

pub async fn set_logo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UrlBody>, JsonRejection>,
) -> Result<Json<Business>, ApiError> {
    let Json(body) = payload?;
    found(state.directory.set_logo(&id, &body.url).await?, &id)
}

pub async fn places_usage(State(state): State<AppState>) -> Json<PlacesUsage> {
    Json(state.places.snapshot())
}

pub async fn set_places_mode(
    State(state): State<AppState>,
    payload: Result<Json<CacheOnlyBody>, JsonRejection>,
) -> Result<Json<PlacesUsage>, ApiError> {
    let Json(body) = payload?;
    state.places.set_cache_only(body.cache_only);
    Ok(Json(state.places.snapshot()))
}

pub async fn sync_places(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SyncOutcome>, ApiError> {
    Ok(Json(state.places.sync_business(&id).await?))
}

fn found(business: Option<Business>, id: &str) -> Result<Json<Business>, ApiError> {
    business
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Business '{id}'")))
}
