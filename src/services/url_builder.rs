//! Translation of generation requests into upstream image URLs.
//!
//! The upstream API takes the prompt as a path segment and every other
//! option as a query parameter:
//!
//! ```text
//! {base}/prompt/{percent-encoded prompt}?model=..&width=..&height=..&_ts=..
//! ```

use crate::api::models::GenerationRequest;
use crate::core::{AppError, Result};
use serde_json::Value;

/// Model used when the request does not name one.
pub const DEFAULT_MODEL: &str = "flux";

/// Model forced for image-to-image requests.
pub const IMAGE_TO_IMAGE_MODEL: &str = "kontext";

/// Width and height used when the request does not set them.
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Query parameter defeating intermediate caches.
pub const CACHE_BUST_PARAM: &str = "_ts";

/// Builds upstream URLs against a fixed base.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
}

impl ImageUrlBuilder {
    /// Create a builder for the given upstream base URL. Trailing slashes are ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the upstream model listing.
    pub fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    /// Build the upstream URL, stamping it with the current time.
    pub fn build(&self, request: &GenerationRequest) -> Result<String> {
        self.build_at(request, chrono::Utc::now().timestamp_millis())
    }

    /// Build the upstream URL with an explicit cache-busting timestamp (unix millis).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] when the prompt is missing or blank.
    pub fn build_at(&self, request: &GenerationRequest, timestamp_ms: i64) -> Result<String> {
        let prompt = validated_prompt(request)?;

        let mut params = query_params(request);
        params.push((CACHE_BUST_PARAM, timestamp_ms.to_string()));

        Ok(format!(
            "{}/prompt/{}?{}",
            self.base_url,
            urlencoding::encode(prompt),
            encode_query(&params)
        ))
    }
}

/// Return the trimmed prompt, or fail if it is missing or blank.
pub fn validated_prompt(request: &GenerationRequest) -> Result<&str> {
    request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Missing prompt".to_string()))
}

/// Query parameters for a request, in wire order, without the cache-busting stamp.
///
/// A non-empty `image` forces the image-to-image model regardless of the
/// requested one.
pub fn query_params(request: &GenerationRequest) -> Vec<(&'static str, String)> {
    let image = request.image.as_deref().filter(|i| !i.is_empty());

    let model = match image {
        Some(_) => IMAGE_TO_IMAGE_MODEL,
        None => request
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL),
    };

    let mut params = vec![("model", model.to_string())];
    if let Some(image) = image {
        params.push(("image", image.to_string()));
    }
    params.push((
        "width",
        request.width.unwrap_or(DEFAULT_DIMENSION).to_string(),
    ));
    params.push((
        "height",
        request.height.unwrap_or(DEFAULT_DIMENSION).to_string(),
    ));

    if let Some(seed) = request.seed.as_ref().and_then(seed_param) {
        params.push(("seed", seed));
    }

    let flags = [
        ("enhance", request.enhance),
        ("nologo", request.nologo),
        ("private", request.private),
        ("safe", request.safe),
    ];
    for (name, value) in flags {
        if value == Some(true) {
            params.push((name, "true".to_string()));
        }
    }

    params
}

/// String form of a seed; `null` and `""` count as absent.
fn seed_param(seed: &Value) -> Option<String> {
    match seed {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const BASE: &str = "https://image.pollinations.ai";

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new(BASE)
    }

    fn request(value: serde_json::Value) -> GenerationRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_prompt_only_defaults() {
        let url = builder()
            .build_at(&GenerationRequest::with_prompt("a cat"), 1700000000000)
            .unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/a%20cat?model=flux&width=1024&height=1024&_ts=1700000000000"
        );
    }

    #[test]
    fn test_image_forces_kontext() {
        let req = request(json!({ "prompt": "x", "image": "http://img", "model": "turbo" }));
        let url = builder().build_at(&req, 1).unwrap();
        assert!(url.contains("model=kontext&image=http%3A%2F%2Fimg"));
        assert!(!url.contains("turbo"));
    }

    #[test]
    fn test_empty_image_is_ignored() {
        let req = request(json!({ "prompt": "x", "image": "", "model": "turbo" }));
        let params = query_params(&req);
        assert_eq!(params[0], ("model", "turbo".to_string()));
        assert!(params.iter().all(|(k, _)| *k != "image"));
    }

    #[test]
    fn test_all_options() {
        let req = request(json!({
            "prompt": "  sunset over hills ",
            "model": "turbo",
            "width": 512,
            "height": 256,
            "seed": 7,
            "enhance": true,
            "nologo": true,
            "private": true,
            "safe": true
        }));
        let url = builder().build_at(&req, 99).unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/sunset%20over%20hills?model=turbo&width=512&height=256&seed=7&enhance=true&nologo=true&private=true&safe=true&_ts=99"
        );
    }

    #[test]
    fn test_false_flags_are_omitted() {
        let req = request(json!({ "prompt": "x", "enhance": false, "safe": false }));
        let params = query_params(&req);
        assert!(params.iter().all(|(k, _)| *k != "enhance" && *k != "safe"));
    }

    #[test]
    fn test_seed_forms() {
        let cases = [
            (json!("abc"), Some("abc")),
            (json!(0), Some("0")),
            (json!(1.5), Some("1.5")),
            (json!(true), Some("true")),
            (json!(""), None),
            (json!(null), None),
        ];
        for (seed, expected) in cases {
            assert_eq!(seed_param(&seed).as_deref(), expected, "seed {}", seed);
        }
    }

    #[test]
    fn test_empty_model_uses_default() {
        let req = request(json!({ "prompt": "x", "model": "" }));
        assert_eq!(query_params(&req)[0], ("model", DEFAULT_MODEL.to_string()));
    }

    #[test]
    fn test_missing_prompt() {
        let result = builder().build_at(&GenerationRequest::default(), 1);
        assert_matches!(result, Err(AppError::InvalidRequest(msg)) if msg == "Missing prompt");
    }

    #[test]
    fn test_empty_and_blank_prompt() {
        for prompt in ["", "   ", "\n\t"] {
            let result = builder().build_at(&GenerationRequest::with_prompt(prompt), 1);
            assert_matches!(result, Err(AppError::InvalidRequest(_)));
        }
    }

    #[test]
    fn test_prompt_reserved_characters_are_encoded() {
        let url = builder()
            .build_at(&GenerationRequest::with_prompt("cats & dogs?/#"), 1)
            .unwrap();
        assert!(url.starts_with(
            "https://image.pollinations.ai/prompt/cats%20%26%20dogs%3F%2F%23?"
        ));
    }

    #[test]
    fn test_trailing_slash_base() {
        let builder = ImageUrlBuilder::new("http://localhost:9000/");
        assert_eq!(builder.base_url(), "http://localhost:9000");
        assert_eq!(builder.models_url(), "http://localhost:9000/models");
    }

    #[test]
    fn test_build_stamps_current_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let url = builder().build(&GenerationRequest::with_prompt("x")).unwrap();
        let after = chrono::Utc::now().timestamp_millis();

        let ts: i64 = url
            .rsplit_once("_ts=")
            .map(|(_, ts)| ts.parse().unwrap())
            .unwrap();
        assert!(ts >= before && ts <= after);
    }
}
