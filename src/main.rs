use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;

mod api;
mod app;
mod config;
mod error;

pub use app::AppState;
pub use config::Config;
pub use error::AppError;

const DEFAULT_LOG_FILTER: &str = "agrovision_backend=info,tower_http=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Docker HEALTHCHECK mode: probe /healthz and exit without starting a server.
    if std::env::args().nth(1).as_deref() == Some("--healthcheck") {
        return healthcheck().await;
    }

    let (config, source) = Config::discover(|key| std::env::var(key).ok())?;

    // RUST_LOG wins over the config file.
    let fallback_filter = config
        .server
        .log_level
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback_filter.into()),
        )
        .init();

    match &source {
        Some(path) => info!(path = %path.display(), "config loaded"),
        None => info!("no config file found, using built-in defaults"),
    }

    let addr = config.server.socket_addr()?;
    info!(
        service = %config.service.name,
        version = %config.service.version,
        environment = %config.service.environment,
        "agrovision-backend starting"
    );

    let state = Arc::new(AppState::new(Arc::new(config)));
    let app = app::build(Arc::clone(&state))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!(
        uptime_secs = state.started_at.elapsed().as_secs(),
        "shutdown complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

/// `agrovision-backend --healthcheck`: exit 0 if `/healthz` answers 2xx, 1 otherwise.
async fn healthcheck() -> anyhow::Result<()> {
    let port = std::env::var(config::PORT_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(8080);

    let healthy = probe(&format!("http://127.0.0.1:{port}/healthz"))
        .await
        .unwrap_or(false);
    std::process::exit(if healthy { 0 } else { 1 });
}

/// GET `url`; `Ok(true)` on any 2xx. Connection failures are errors.
async fn probe(url: &str) -> anyhow::Result<bool> {
    let resp = reqwest::get(url)
        .await
        .with_context(|| format!("requesting {url}"))?;
    Ok(resp.status().is_success())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::probe;

    #[tokio::test]
    async fn probe_succeeds_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let healthy = probe(&format!("{}/healthz", server.uri())).await.unwrap();
        assert!(healthy);
    }

    #[tokio::test]
    async fn probe_fails_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let healthy = probe(&format!("{}/healthz", server.uri())).await.unwrap();
        assert!(!healthy);
    }

    #[tokio::test]
    async fn probe_errors_when_nothing_listens() {
        // Port 1 is privileged and unused in test environments.
        let result = probe("http://127.0.0.1:1/healthz").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn probe_against_live_server() {
        use std::sync::Arc;

        let state = Arc::new(crate::AppState::new(Arc::new(crate::Config::default())));
        let app = crate::app::build(state).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        assert!(probe(&format!("http://{addr}/healthz")).await.unwrap());
        assert!(probe(&format!("http://{addr}/api/test/ping")).await.unwrap());
        assert!(!probe(&format!("http://{addr}/missing")).await.unwrap());
    }
}
