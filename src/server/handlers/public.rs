//! Public directory endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::super::error::ApiError;
use super::super::types::{AppState, HealthResponse, ReportQuery};
use crate::directory::Listing;
use crate::error_handling::RequestEvent;
use crate::storage::{
    Business, BusinessQuery, NewReview, NewScamReport, Review, ReviewSource, ScamReport,
};

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.directory.backend_name(),
        places_cache_only: state.places.is_cache_only(),
    })
}

pub async fn list_businesses(
    State(state): State<AppState>,
    query: Result<Query<BusinessQuery>, QueryRejection>,
) -> Result<Json<Listing>, ApiError> {
    let Query(query) = query?;
    let listing = state.directory.list_businesses(&query).await;
    if state.directory.is_fallback(&listing) {
        state.stats.increment(RequestEvent::FallbackServed);
    } else {
        state.stats.increment(RequestEvent::ListingServed);
    }
    Ok(Json(listing))
}

pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Business>, ApiError> {
    state
        .directory
        .get_business(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Business '{id}'")))
}

pub async fn business_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    if state.directory.get_business(&id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Business '{id}'")));
    }
    Ok(Json(state.directory.list_reviews(&id).await?))
}

pub async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.directory.categories().await)
}

pub async fn create_review(
    State(state): State<AppState>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let Json(mut new) = payload?;
    // Google reviews only arrive through Places sync.
    new.source = ReviewSource::User;
    new.created_at_ms = None;
    let review = state.directory.create_review(new).await?;
    state.stats.increment(RequestEvent::ReviewSubmitted);
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn create_report(
    State(state): State<AppState>,
    payload: Result<Json<NewScamReport>, JsonRejection>,
) -> Result<(StatusCode, Json<ScamReport>), ApiError> {
    let Json(mut new) = payload?;
    new.created_at_ms = None;
    let report = state.directory.create_report(new).await?;
    state.stats.increment(RequestEvent::ReportSubmitted);
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn list_reports(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Vec<ScamReport>>, ApiError> {
    let Query(query) = query?;
    let business_id = query
        .business_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    Ok(Json(state.directory.list_reports(business_id).await?))
}
