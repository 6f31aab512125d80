use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Model path under the fal.ai synchronous endpoint.
pub const FLUX_MODEL_PATH: &str = "fal-ai/flux/schnell";

/// Fixed seed so a re-run at the same strength renders the same image.
const IMAGE_SEED: u64 = 42;

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    image_size: &'static str,
    seed: u64,
    enable_safety_checker: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageResult {
    pub images: Vec<GeneratedImage>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    /// Ephemeral download URL; the pipeline persists a copy and stores its
    /// own public URL instead.
    pub url: String,
    pub content_type: Option<String>,
}

/// Client for the image-generation service.
pub struct FalClient {
    base_url: String,
    /// Pre-computed `"Key <key>"` header value.
    auth_header: String,
    client: reqwest::Client,
}

impl FalClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Key {api_key}"),
            client: super::http_client(),
        }
    }

    /// Render one landscape image for `prompt`. Blocks until the service
    /// has finished rendering.
    pub async fn generate_image(&self, prompt: &str) -> anyhow::Result<ImageResult> {
        let request = ImageRequest {
            prompt,
            image_size: "landscape_4_3",
            seed: IMAGE_SEED,
            enable_safety_checker: false,
        };

        let response = self
            .client
            .post(format!("{}/{FLUX_MODEL_PATH}", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&request)
            .send()
            .await
            .context("image generation request failed")?;

        if !response.status().is_success() {
            return Err(super::api_error("fal", response).await);
        }

        response
            .json()
            .await
            .context("image generation JSON decode failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_flux_arguments() {
        let request = ImageRequest {
            prompt: "a painted cat",
            image_size: "landscape_4_3",
            seed: IMAGE_SEED,
            enable_safety_checker: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "a painted cat");
        assert_eq!(json["image_size"], "landscape_4_3");
        assert_eq!(json["seed"], 42);
        assert_eq!(json["enable_safety_checker"], false);
    }

    #[test]
    fn result_deserializes_image_urls() {
        let json = r#"{
            "images": [{"url": "https://cdn.example/img.png", "content_type": "image/png"}],
            "seed": 42
        }"#;
        let result: ImageResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].url, "https://cdn.example/img.png");
        assert_eq!(result.seed, Some(42));
    }

    #[test]
    fn result_deserializes_empty_images() {
        let result: ImageResult = serde_json::from_str(r#"{"images":[]}"#).unwrap();
        assert!(result.images.is_empty());
    }

    #[test]
    fn strips_trailing_slash() {
        let client = FalClient::new("https://fal.run/", "fk");
        assert_eq!(client.base_url, "https://fal.run");
        assert_eq!(client.auth_header, "Key fk");
    }
}
