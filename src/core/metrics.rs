//! Prometheus metrics for monitoring the image relay server.
//!
//! This module provides a centralized metrics registry for tracking inbound
//! requests, upstream calls, model-list fallbacks and relayed image bytes.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter, register_int_counter_vec,
    GaugeVec, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, and status
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream calls by operation and outcome (status code or "error")
    pub upstream_requests: IntCounterVec,

    /// Upstream response latency (time to headers) in seconds
    pub upstream_latency: HistogramVec,

    /// Times the model list was served from the static fallback
    pub model_list_fallbacks: IntCounter,

    /// Image bytes relayed to callers
    pub image_bytes: IntCounter,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls will
/// return the same instance.
///
/// # Examples
///
/// ```no_run
/// use image_relay_rust::core::metrics::init_metrics;
///
/// let metrics = init_metrics();
/// metrics.request_count.with_label_values(&["GET", "/health", "200"]).inc();
/// ```
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "image_relay_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "image_relay_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "image_relay_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_requests = register_int_counter_vec!(
            "image_relay_upstream_requests_total",
            "Upstream calls by operation and outcome",
            &["operation", "outcome"]
        )
        .expect("Failed to register upstream_requests metric");

        let upstream_latency = register_histogram_vec!(
            "image_relay_upstream_latency_seconds",
            "Upstream response latency in seconds",
            &["operation"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]
        )
        .expect("Failed to register upstream_latency metric");

        let model_list_fallbacks = register_int_counter!(
            "image_relay_model_list_fallbacks_total",
            "Model list requests answered with the static fallback"
        )
        .expect("Failed to register model_list_fallbacks metric");

        let image_bytes = register_int_counter!(
            "image_relay_image_bytes_total",
            "Image bytes relayed to callers"
        )
        .expect("Failed to register image_bytes metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_requests,
            upstream_latency,
            model_list_fallbacks,
            image_bytes,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}

/// Record the outcome of one upstream call.
pub fn record_upstream(operation: &str, outcome: &str, elapsed_secs: f64) {
    let metrics = get_metrics();
    metrics
        .upstream_requests
        .with_label_values(&[operation, outcome])
        .inc();
    metrics
        .upstream_latency
        .with_label_values(&[operation])
        .observe(elapsed_secs);
}
