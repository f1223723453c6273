//! HTTP request handlers for the image relay API.
//!
//! This module contains the endpoint handlers for image generation, model
//! listing, health checks and metrics.

use crate::api::models::{GenerationRequest, HealthResponse};
use crate::api::upstream::{
    build_upstream_request, resolve_auth, send_upstream, upstream_error, UpstreamAuth,
    OP_GENERATE, OP_LIST_MODELS,
};
use crate::core::config::AppConfig;
use crate::core::logging::get_request_id;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use crate::services::ImageUrlBuilder;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use futures::TryStreamExt;
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use std::sync::Arc;

/// Models reported when the upstream listing is unavailable.
pub const FALLBACK_MODELS: [&str; 2] = ["flux", "turbo"];

/// Content type assumed when the upstream does not send one.
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/png";

/// Response header exposing the upstream URL an image was fetched from.
pub const IMAGE_URL_HEADER: &str = "x-image-url";

/// Shared application state, immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http_client: reqwest::Client,
    pub url_builder: ImageUrlBuilder,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        let url_builder = ImageUrlBuilder::new(config.upstream_base_url.clone());
        Self {
            config,
            http_client,
            url_builder,
        }
    }
}

/// List available models.
///
/// Proxies the upstream listing. Any failure (transport, non-2xx status,
/// non-JSON body) is logged and answered with [`FALLBACK_MODELS`].
#[tracing::instrument(skip(state))]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<Value> {
    match fetch_models(&state).await {
        Ok(models) => Json(models),
        Err(e) => {
            tracing::warn!(
                request_id = %get_request_id(),
                error = %e,
                "Model list unavailable, serving fallback"
            );
            get_metrics().model_list_fallbacks.inc();
            Json(json!(FALLBACK_MODELS))
        }
    }
}

async fn fetch_models(state: &AppState) -> Result<Value> {
    let url = state.url_builder.models_url();
    let request = build_upstream_request(&state.http_client, &url, UpstreamAuth::None);
    let response = send_upstream(request, OP_LIST_MODELS, &url).await?;

    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }

    Ok(response.json::<Value>().await?)
}

/// Generate an image.
///
/// Builds the upstream URL from the request body, calls the upstream with
/// the resolved credential and relays the image bytes as they arrive.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let url = state.url_builder.build(&payload)?;
    let auth = resolve_auth(&headers, &state.config);

    tracing::debug!(
        request_id = %get_request_id(),
        url = %url,
        auth = auth.source(),
        "Processing image generation request"
    );

    let request = build_upstream_request(&state.http_client, &url, auth);
    let response = send_upstream(request, OP_GENERATE, &url).await?;

    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
        .to_string();
    let content_length = response.content_length();

    let image_bytes = get_metrics().image_bytes.clone();
    let stream = response
        .bytes_stream()
        .inspect_ok(move |chunk| image_bytes.inc_by(chunk.len() as u64));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(IMAGE_URL_HEADER, url);
    if let Some(len) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Basic health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus metrics endpoint.
#[tracing::instrument]
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(buffer.into())
        .map_err(|e| AppError::Internal(e.to_string()))
}
