//! Orchestrator liveness probe, separate from the `/api/test` group.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// `GET /healthz` — always `200 {"status": "ok"}`.
///
/// Touches no state. This is what `agrovision-backend --healthcheck` polls.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
