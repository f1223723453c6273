//! Error types and handling for the image relay server.
//!
//! This module provides a unified error type [`AppError`] that wraps the
//! failure modes of a relayed request and converts them into plain-text
//! HTTP responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application.
///
/// Every failure is terminal for the request it occurs in; nothing is retried.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request body or missing prompt
    #[error("{0}")]
    InvalidRequest(String),

    /// Upstream answered with a non-success status; forwarded verbatim
    #[error("{body}")]
    Upstream { status: u16, body: String },

    /// Network-level failure reaching the upstream service
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status reported to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Transport(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Transport(e) if e.is_timeout() => "Gateway timeout".to_string(),
            other => other.to_string(),
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::InvalidRequest("Missing prompt".to_string());
        assert_eq!(err.to_string(), "Missing prompt");

        let err = AppError::Upstream {
            status: 500,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "rate limited");

        let err = AppError::Internal("test error".to_string());
        assert_eq!(err.to_string(), "Internal server error: test error");
    }

    #[tokio::test]
    async fn test_invalid_request_response() {
        let response = AppError::InvalidRequest("Missing prompt".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "Missing prompt");
    }

    #[tokio::test]
    async fn test_upstream_status_forwarded() {
        let response = AppError::Upstream {
            status: 429,
            body: "slow down".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_text(response).await, "slow down");
    }

    #[test]
    fn test_upstream_invalid_status_maps_to_bad_gateway() {
        let err = AppError::Upstream {
            status: 42,
            body: String::new(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_error_response() {
        let response = AppError::Internal("custom error".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_from_anyhow() {
        let app_err: AppError = anyhow::anyhow!("bad config").into();
        assert!(matches!(app_err, AppError::Config(_)));
        assert_eq!(app_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_transport_error_is_bad_request() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/models")
            .send()
            .await
            .unwrap_err();
        let app_err = AppError::from(err);
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transport_timeout_is_gateway_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let err = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap()
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();
        drop(listener);

        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_text(response).await, "Gateway timeout");
    }
}
