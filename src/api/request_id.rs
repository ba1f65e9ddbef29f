//! Request ID middleware.
//!
//! Every inbound request carries an `X-Request-ID` through the service:
//!
//! - Accepted from the caller if they already provide a non-empty one
//! - Freshly generated (UUID v4) otherwise
//! - Stored as an axum [`Extension`](axum::Extension) for handlers
//! - Echoed back in the `X-Request-ID` response header
//! - Attached to a [`tracing`] span so log lines for the request carry it
//!
//! Lets a monitoring system correlate a failed probe with server logs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument as _;
use uuid::Uuid;

pub const HEADER: &str = "x-request-id";

/// The id assigned to the current request.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Apply inside the `TraceLayer` so the id span nests under the HTTP span.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::debug_span!("request_id", id = %id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(HEADER, header_value);
    }

    response
}
