//! Image Relay Server - a thin HTTP relay in front of an image generation API
//!
//! The relay accepts JSON generation requests from a browser UI, translates
//! them into the upstream's URL-based API, optionally attaches a bearer
//! credential and streams the resulting image back. It also proxies the
//! upstream model listing with a static fallback.
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging, metrics, middleware)
//! - [`api`]: HTTP handlers, request models, upstream helpers and routing
//! - [`services`]: Business logic (request-to-URL translation)
//!
//! # Configuration
//!
//! All settings are optional environment variables:
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `POLLINATIONS_TOKEN`: Bearer token for upstream calls
//! - `ALLOW_CLIENT_TOKEN`: Accept a per-request `x-pollinations-token` header (default: false)
//! - `UPSTREAM_BASE_URL`: Upstream API base (default: https://image.pollinations.ai)
//! - `REQUEST_TIMEOUT_SECS`: Upstream request timeout in seconds (default: 300)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `STATIC_DIR`: Directory holding the browser UI (default: public)
//! - `MAX_BODY_BYTES`: Request body limit (default: 2 MiB)

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState, GenerationRequest};
pub use core::{AppConfig, AppError, Result};
pub use services::ImageUrlBuilder;
