//! Configuration types for the AgroVision backend.
//!
//! Config is loaded once at startup from a TOML file and validated before the
//! server opens its port. Every field has a default, so the service also runs
//! with no file at all; an explicitly named file that cannot be read or parsed
//! is a startup error rather than a silent fallback.
//!
//! # Example
//! ```toml
//! [server]
//! port = 8080
//! bind_address = "0.0.0.0"
//! request_timeout_secs = 30
//! cors_allowed_origins = ["http://localhost:3000"]
//!
//! [service]
//! name        = "AgroVision Backend"
//! version     = "1.0.0"
//! environment = "development"
//! ```

use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "AGROVISION_CONFIG";

/// Env var overriding `server.port`. Also read by `--healthcheck`.
pub const PORT_ENV: &str = "AGROVISION_PORT";

/// Used when [`CONFIG_PATH_ENV`] is unset. Optional: missing means defaults.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/agrovision/config.toml";

/// A config value that parsed but cannot be served with.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("server.request_timeout_secs must be non-zero")]
    ZeroTimeout,

    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("server.bind_address `{0}` is not an IP address")]
    InvalidBindAddress(String),

    #[error("CORS origin `{0}` must be a single explicit origin")]
    InvalidCorsOrigin(String),

    #[error("environment variable {var}=`{value}` is not a valid value")]
    InvalidEnvOverride { var: &'static str, value: String },
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

impl Config {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("parsing config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the startup config.
    ///
    /// `env` is the environment lookup (`std::env::var` in production). The
    /// file named by [`CONFIG_PATH_ENV`] must exist; [`DEFAULT_CONFIG_PATH`]
    /// is used only if present. Env overrides are applied last and the result
    /// is re-validated.
    pub fn discover<F>(env: F) -> anyhow::Result<(Self, Option<PathBuf>)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, source) = match env(CONFIG_PATH_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                (Self::load(&path)?, Some(path))
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    (Self::load(&path)?, Some(path))
                } else {
                    (Self::default(), None)
                }
            }
        };

        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok((config, source))
    }

    /// Apply `AGROVISION_PORT` on top of whatever the file said.
    pub fn apply_env_overrides<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env(PORT_ENV) {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnvOverride { var: PORT_ENV, value })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::EmptyField("service.name"));
        }
        if self.service.version.trim().is_empty() {
            return Err(ConfigError::EmptyField("service.version"));
        }
        self.server.socket_addr()?;
        self.server.cors_origins()?;
        Ok(())
    }
}

/// Listener and HTTP-layer settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen port (default: 8080).
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Listen address (default: `0.0.0.0`).
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Per-request timeout enforced by the HTTP layer (default: 30).
    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Browser origins allowed to call the API (default: the local frontend dev server).
    #[serde(default = "defaults::cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::port(),
            bind_address: defaults::bind_address(),
            request_timeout_secs: defaults::request_timeout_secs(),
            cors_allowed_origins: defaults::cors_allowed_origins(),
            log_level: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.bind_address.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_allowed_origins
            .iter()
            .map(|origin| match origin.as_str() {
                // Wildcards cannot be combined with an explicit origin list.
                "*" => Err(ConfigError::InvalidCorsOrigin(origin.clone())),
                _ => HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidCorsOrigin(origin.clone())),
            })
            .collect()
    }
}

/// Identity reported by the probe endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "defaults::service_name")]
    pub name: String,

    #[serde(default = "defaults::service_version")]
    pub version: String,

    /// Deployment label, logged at startup (default: `development`).
    #[serde(default = "defaults::environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: defaults::service_name(),
            version: defaults::service_version(),
            environment: defaults::environment(),
        }
    }
}

mod defaults {
    pub fn port() -> u16 { 8080 }
    pub fn bind_address() -> String { "0.0.0.0".into() }
    pub fn request_timeout_secs() -> u64 { 30 }
    pub fn cors_allowed_origins() -> Vec<String> { vec!["http://localhost:3000".into()] }
    pub fn service_name() -> String { "AgroVision Backend".into() }
    pub fn service_version() -> String { "1.0.0".into() }
    pub fn environment() -> String { "development".into() }
}
