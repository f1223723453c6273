//! Configuration management for the image relay server.
//!
//! Configuration is read once at process start from environment variables
//! (optionally seeded from a `.env` file) and then shared read-only with
//! every handler through the application state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token attached to upstream requests when the caller supplies none
    #[serde(default, rename = "pollinations_token")]
    pub default_token: Option<String>,

    /// Whether callers may supply their own token via the `x-pollinations-token` header
    #[serde(default)]
    pub allow_client_token: bool,

    /// Base URL of the upstream image generation API
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Request timeout in seconds for upstream calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Whether to verify SSL certificates for upstream requests
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Directory holding the browser UI assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_base_url() -> String {
    "https://image.pollinations.ai".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_verify_ssl() -> bool {
    true
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_token: None,
            allow_client_token: false,
            upstream_base_url: default_upstream_base_url(),
            request_timeout_secs: default_request_timeout(),
            verify_ssl: default_verify_ssl(),
            static_dir: default_static_dir(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Recognised variables: `HOST`, `PORT`, `POLLINATIONS_TOKEN`,
    /// `ALLOW_CLIENT_TOKEN`, `UPSTREAM_BASE_URL`, `REQUEST_TIMEOUT_SECS`,
    /// `VERIFY_SSL`, `STATIC_DIR`, `MAX_BODY_BYTES`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use image_relay_rust::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("Failed to load config");
    /// println!("listening on {}", config.socket_addr().unwrap());
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::default())
    }

    /// Load configuration from an explicit set of variables instead of the
    /// process environment. Keys use the same upper-case names as `from_env`.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_source(config::Environment::default().source(Some(vars)))
    }

    fn from_source(source: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration from environment")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        if config.upstream_base_url.trim().is_empty() {
            config.upstream_base_url = default_upstream_base_url();
        }

        Ok(config)
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Configured fallback token, ignoring empty values.
    pub fn default_token(&self) -> Option<&str> {
        self.default_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
