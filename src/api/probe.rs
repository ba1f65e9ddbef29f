//! Smoke-test endpoints mounted under `/api/test`.
//!
//! | Route     | Body |
//! |-----------|------|
//! | `/health` | `{"status":"UP","service":…,"timestamp":…,"version":…}` |
//! | `/hello`  | `{"message":…,"framework":"Axum","language":"Rust"}` |
//! | `/ping`   | `pong` (text/plain) |
//!
//! Every response is built fresh per request. Only `/health` reads anything
//! that changes between calls: the wall clock.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;

pub const STATUS_UP: &str = "UP";
pub const FRAMEWORK: &str = "Axum";
pub const LANGUAGE: &str = "Rust";
pub const PONG: &str = "pong";

/// Routes relative to the `/api/test` prefix.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/hello", get(hello))
        .route("/ping", get(ping))
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: String,
    /// Serialized as RFC 3339 in UTC.
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelloMessage {
    pub message: String,
    pub framework: &'static str,
    pub language: &'static str,
}

/// `GET /api/test/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let service = &state.config.service;
    Json(HealthStatus {
        status: STATUS_UP,
        service: service.name.clone(),
        timestamp: Utc::now(),
        version: service.version.clone(),
    })
}

/// `GET /api/test/hello`
pub async fn hello(State(state): State<Arc<AppState>>) -> Json<HelloMessage> {
    Json(HelloMessage {
        message: format!("Hello from {}!", state.config.service.name),
        framework: FRAMEWORK,
        language: LANGUAGE,
    })
}

/// `GET /api/test/ping`
pub async fn ping() -> &'static str {
    PONG
}
