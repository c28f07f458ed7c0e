// Shared test helpers for building servers and sending requests.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use visa_directory::server::build_router;
use visa_directory::{build_state, Config};

pub const ADMIN_PASSWORD: &str = "test-password";

/// SQLite-backed configuration rooted in `dir`, with admin login enabled.
#[allow(dead_code)] // Used by other test files
pub fn sqlite_config(dir: &TempDir) -> Config {
    Config {
        db_path: dir.path().join("directory.db"),
        admin_password: ADMIN_PASSWORD.to_string(),
        ..Default::default()
    }
}

/// Router built from `config` the same way `run_server` builds it.
#[allow(dead_code)]
pub async fn app_for(config: &Config) -> Router {
    let state = build_state(config)
        .await
        .expect("Failed to build application state");
    build_router(state)
}

/// Sends one request and decodes the body as JSON (`Null` for empty bodies).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router should not fail");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

#[allow(dead_code)]
pub fn json(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

#[allow(dead_code)]
pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Logs in as admin and returns the bearer token.
#[allow(dead_code)]
pub async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        json(
            "POST",
            "/api/admin/login",
            serde_json::json!({"username": "admin", "password": ADMIN_PASSWORD}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"]
        .as_str()
        .expect("login response should carry a token")
        .to_string()
}

/// Creates a business through the admin API and returns its id.
#[allow(dead_code)]
pub async fn create_business(app: &Router, token: &str, body: Value) -> String {
    let (status, created) = send(app, json("POST", "/api/admin/businesses", body, Some(token))).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created["id"]
        .as_str()
        .expect("created business should have an id")
        .to_string()
}
