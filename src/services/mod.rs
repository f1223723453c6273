//! Business logic services for the image relay.
//!
//! This module contains service layer components that implement
//! core business logic, independent of the HTTP layer.

pub mod url_builder;

// Re-export commonly used types
pub use url_builder::{
    query_params, validated_prompt, ImageUrlBuilder, CACHE_BUST_PARAM, DEFAULT_DIMENSION,
    DEFAULT_MODEL, IMAGE_TO_IMAGE_MODEL,
};
