//! API request and response models.
//!
//! This module defines the data structures exchanged with browser clients.

use serde::{Deserialize, Serialize};

/// Image generation request as posted by the browser UI.
///
/// Every field is optional at decode time so that a missing prompt can be
/// reported as a validation failure rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt; required and non-empty
    #[serde(default)]
    pub prompt: Option<String>,

    /// Model identifier (defaults to "flux")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Image width in pixels (defaults to 1024)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Image height in pixels (defaults to 1024)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Opaque seed, forwarded in its string form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhance: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nologo: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<bool>,

    /// Source image URL; switches the request to image-to-image mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl GenerationRequest {
    /// Convenience constructor for a prompt-only request.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
