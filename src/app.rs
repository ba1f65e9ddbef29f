//! Shared state and the assembled axum application.

use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{api, config::Config, error};

/// Shared application state injected into handlers via [`axum::extract::State`].
///
/// Read-only after startup; handlers only ever borrow from it.
#[derive(Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Process start time, logged on shutdown.
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            started_at: std::time::Instant::now(),
        }
    }
}

/// Build the routes without middleware.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(api::health::healthz))
        .nest("/api/test", api::probe::routes())
        .fallback(error::not_found)
        .with_state(state)
}

/// Build the full application: routes plus the request-id, CORS, timeout and
/// tracing layers.
///
/// Layer order matters: the trace layer is outermost so the request-id span
/// nests inside it.
pub fn build(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = &state.config.server;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(server.cors_origins()?))
        .allow_methods([Method::GET]);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(DefaultOnResponse::new().level(tracing::Level::INFO));

    let timeout = TimeoutLayer::new(server.request_timeout());

    Ok(routes(Arc::clone(&state))
        .layer(timeout)
        .layer(cors)
        .layer(axum::middleware::from_fn(api::request_id::request_id_middleware))
        .layer(trace))
}
