//! Route table and middleware stack.

use crate::api::handlers::{generate_image, health, list_models, metrics_handler, AppState};
use crate::core::middleware::{request_id_middleware, MetricsMiddleware};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the application router.
///
/// When the configured static directory exists it serves every path not
/// matched by an API route, which is how the browser UI is hosted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let static_dir = state.config.static_dir.clone();

    let mut router: Router = Router::new()
        .route("/api/models", get(list_models))
        .route("/api/generate", post(generate_image))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    if Path::new(&static_dir).is_dir() {
        tracing::info!("Serving static assets from {}", static_dir);
        router = router.fallback_service(ServeDir::new(static_dir));
    } else {
        tracing::debug!("Static asset directory {} not found, UI disabled", static_dir);
    }

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(MetricsMiddleware::track_metrics))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
