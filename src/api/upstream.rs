//! Upstream request execution helpers.
//!
//! Credential resolution, outbound request construction and the shared
//! logging/metrics around upstream calls live here so handlers stay focused
//! on shaping responses.

use crate::core::config::AppConfig;
use crate::core::logging::get_request_id;
use crate::core::metrics::record_upstream;
use crate::core::AppError;
use axum::http::HeaderMap;
use std::error::Error;
use std::time::{Duration, Instant};

/// Header through which a caller may supply their own upstream token.
pub const CLIENT_TOKEN_HEADER: &str = "x-pollinations-token";

/// Operation labels used in logs and metrics.
pub const OP_LIST_MODELS: &str = "list_models";
pub const OP_GENERATE: &str = "generate";

/// Where the credential for an upstream call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamAuth<'a> {
    /// Supplied by the caller through [`CLIENT_TOKEN_HEADER`]
    Client(&'a str),
    /// Process-wide token from configuration
    Configured(&'a str),
    None,
}

impl<'a> UpstreamAuth<'a> {
    pub fn token(&self) -> Option<&'a str> {
        match *self {
            UpstreamAuth::Client(token) | UpstreamAuth::Configured(token) => Some(token),
            UpstreamAuth::None => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            UpstreamAuth::Client(_) => "client",
            UpstreamAuth::Configured(_) => "configured",
            UpstreamAuth::None => "none",
        }
    }
}

/// Create the shared HTTP client with connection pooling.
///
/// The configured request timeout bounds every upstream call; on expiry the
/// call fails with a timeout error that is reported as a gateway timeout.
pub fn create_http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}

/// Pick the credential for an upstream call.
///
/// The caller's header wins when `allow_client_token` is enabled, then the
/// configured token, then none. Empty values are treated as absent.
pub fn resolve_auth<'a>(headers: &'a HeaderMap, config: &'a AppConfig) -> UpstreamAuth<'a> {
    if config.allow_client_token {
        let client_token = headers
            .get(CLIENT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = client_token {
            return UpstreamAuth::Client(token);
        }
    }

    match config.default_token() {
        Some(token) => UpstreamAuth::Configured(token),
        None => UpstreamAuth::None,
    }
}

/// Build a GET request to the upstream, attaching bearer auth only when a token is present.
pub fn build_upstream_request(
    http_client: &reqwest::Client,
    url: &str,
    auth: UpstreamAuth<'_>,
) -> reqwest::RequestBuilder {
    let request = http_client.get(url);
    match auth.token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send an upstream request, recording latency and outcome.
///
/// Transport failures are logged and converted into [`AppError::Transport`].
/// Non-success statuses are returned as-is for the caller to interpret.
pub async fn send_upstream(
    request: reqwest::RequestBuilder,
    operation: &'static str,
    url: &str,
) -> Result<reqwest::Response, AppError> {
    let start = Instant::now();

    match request.send().await {
        Ok(response) => {
            let elapsed = start.elapsed().as_secs_f64();
            record_upstream(operation, response.status().as_str(), elapsed);
            tracing::debug!(
                request_id = %get_request_id(),
                operation = operation,
                url = %url,
                status = %response.status(),
                elapsed_secs = elapsed,
                "Upstream request completed"
            );
            Ok(response)
        }
        Err(e) => {
            record_upstream(operation, "error", start.elapsed().as_secs_f64());
            log_transport_error(operation, url, &e);
            Err(AppError::Transport(e))
        }
    }
}

/// Emit a unified error log for a transport failure.
pub fn log_transport_error(operation: &str, url: &str, error: &reqwest::Error) {
    tracing::error!(
        request_id = %get_request_id(),
        operation = operation,
        url = %url,
        error = %error,
        error_source = ?error.source(),
        is_timeout = error.is_timeout(),
        is_connect = error.is_connect(),
        "HTTP request failed to upstream"
    );
}

/// Turn a non-success upstream response into [`AppError::Upstream`].
///
/// The upstream body is forwarded verbatim; if it cannot be read or is
/// empty a message naming the status is synthesized.
pub async fn upstream_error(response: reqwest::Response) -> AppError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .ok()
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| format!("Upstream error {}", status));

    tracing::warn!(
        request_id = %get_request_id(),
        status = status,
        body_len = body.len(),
        "Upstream returned error status"
    );

    AppError::Upstream { status, body }
}
