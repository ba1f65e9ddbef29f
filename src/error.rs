//! HTTP error type for axum request handlers.
//!
//! The probe endpoints themselves cannot fail, so the only error a client can
//! see is a request for a path nothing is mounted on. [`AppError`] renders it
//! as JSON via [`IntoResponse`] so every response the service sends, error or
//! not, has a machine-readable body.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound { path: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::NotFound { path } => {
                tracing::debug!(%path, "no route matched");
                (status, Json(json!({ "error": self.to_string(), "path": path }))).into_response()
            }
        }
    }
}

/// Router fallback: any unmatched path becomes [`AppError::NotFound`].
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound { path: uri.path().to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_renders_404_with_json_body() {
        let err = AppError::NotFound { path: "/api/test/missing".into() };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "not found");
        assert_eq!(json["path"], "/api/test/missing");
    }

    #[tokio::test]
    async fn fallback_handler_drops_query_string_from_path() {
        let uri: Uri = "/nowhere?x=1".parse().unwrap();
        let err = not_found(uri).await;
        match err {
            AppError::NotFound { path } => assert_eq!(path, "/nowhere"),
        }
    }

    #[test]
    fn display_is_short_reason_phrase() {
        let err = AppError::NotFound { path: "/x".into() };
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
