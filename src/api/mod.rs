//! API layer for the image relay server.
//!
//! This module contains the HTTP handlers, request/response models,
//! upstream call helpers and the route table.

pub mod handlers;
pub mod models;
pub mod router;
pub mod upstream;

// Re-export commonly used types
pub use handlers::{
    generate_image, health, list_models, metrics_handler, AppState, DEFAULT_IMAGE_CONTENT_TYPE,
    FALLBACK_MODELS, IMAGE_URL_HEADER,
};
pub use models::{GenerationRequest, HealthResponse};
pub use router::build_router;
pub use upstream::{create_http_client, resolve_auth, UpstreamAuth, CLIENT_TOKEN_HEADER};
