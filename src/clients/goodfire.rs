use std::fmt;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Base model every variant is constructed against.
pub const BASE_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct";

/// Fixed seed so repeated completions for the same sweep step are identical.
pub const CHAT_SEED: u64 = 42;
pub const CHAT_MAX_COMPLETION_TOKENS: u32 = 2048;

/// One steering direction returned by the feature search, cached verbatim
/// in the `features` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub uuid: Uuid,
    pub label: String,
    pub index_in_sae: u64,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A base model plus a set of active feature-strength overrides.
///
/// Serialized in place of the model name in chat requests, so the service
/// applies the steering edits during generation.
#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub base_model: String,
    pub edits: Vec<FeatureEdit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureEdit {
    pub feature_id: Uuid,
    pub feature_label: String,
    pub index_in_sae: u64,
    pub value: f64,
}

impl Variant {
    pub fn new(base_model: impl Into<String>) -> Self {
        Self {
            base_model: base_model.into(),
            edits: Vec::new(),
        }
    }

    /// Set the steering strength for a feature, replacing any existing edit
    /// for the same feature.
    pub fn set(&mut self, feature: &Feature, value: f64) {
        if let Some(edit) = self
            .edits
            .iter_mut()
            .find(|edit| edit.feature_id == feature.uuid)
        {
            edit.value = value;
            return;
        }
        self.edits.push(FeatureEdit {
            feature_id: feature.uuid,
            feature_label: feature.label.clone(),
            index_in_sae: feature.index_in_sae,
            value,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeatureSearchRequest<'a> {
    query: &'a str,
    model: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct FeatureSearchResponse {
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a Variant,
    messages: &'a [ChatMessage],
    seed: u64,
    temperature: f64,
    max_completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the feature-search / steered chat-completion service.
pub struct GoodfireClient {
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value.
    auth_header: String,
    client: reqwest::Client,
}

impl GoodfireClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {api_key}"),
            client: super::http_client(),
        }
    }

    /// Ranked feature search: the top `top_k` steering directions matching
    /// `query` on the variant's base model.
    pub async fn search_features(
        &self,
        query: &str,
        variant: &Variant,
        top_k: usize,
    ) -> anyhow::Result<Vec<Feature>> {
        let request = FeatureSearchRequest {
            query,
            model: &variant.base_model,
            top_k,
        };

        let response = self
            .client
            .post(format!("{}/v1/features/search", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&request)
            .send()
            .await
            .context("feature search request failed")?;

        if !response.status().is_success() {
            return Err(super::api_error("goodfire", response).await);
        }

        let body: FeatureSearchResponse = response
            .json()
            .await
            .context("feature search JSON decode failed")?;
        Ok(body.features)
    }

    /// Deterministic single-turn completion under the variant's steering
    /// edits. Returns the first choice's message text.
    pub async fn chat_completion(
        &self,
        variant: &Variant,
        messages: &[ChatMessage],
    ) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: variant,
            messages,
            seed: CHAT_SEED,
            temperature: 0.0,
            max_completion_tokens: CHAT_MAX_COMPLETION_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?;

        if !response.status().is_success() {
            return Err(super::api_error("goodfire", response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("chat completion JSON decode failed")?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ApiError::EmptyResponse { service: "goodfire" }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(label: &str) -> Feature {
        Feature {
            uuid: Uuid::new_v4(),
            label: label.to_string(),
            index_in_sae: 7,
        }
    }

    #[test]
    fn variant_set_adds_edit() {
        let mut variant = Variant::new(BASE_MODEL);
        variant.set(&feature("whiskers"), 0.25);
        assert_eq!(variant.edits.len(), 1);
        assert_eq!(variant.edits[0].value, 0.25);
    }

    #[test]
    fn variant_set_replaces_edit_for_same_feature() {
        let mut variant = Variant::new(BASE_MODEL);
        let f = feature("whiskers");
        variant.set(&f, -0.5);
        variant.set(&f, 0.5);
        assert_eq!(variant.edits.len(), 1);
        assert_eq!(variant.edits[0].value, 0.5);
    }

    #[test]
    fn strips_trailing_slash() {
        let client = GoodfireClient::new("https://api.goodfire.ai/", "gf-key");
        assert_eq!(client.base_url, "https://api.goodfire.ai");
        assert_eq!(client.auth_header, "Bearer gf-key");
    }

    #[test]
    fn chat_request_serializes_variant_and_sampling_params() {
        let mut variant = Variant::new(BASE_MODEL);
        variant.set(&feature("whiskers"), -0.5);
        let messages = [ChatMessage::user("hello")];
        let request = ChatRequest {
            model: &variant,
            messages: &messages,
            seed: CHAT_SEED,
            temperature: 0.0,
            max_completion_tokens: CHAT_MAX_COMPLETION_TOKENS,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"]["base_model"], BASE_MODEL);
        assert_eq!(json["model"]["edits"][0]["value"], -0.5);
        assert_eq!(json["seed"], 42);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["max_completion_tokens"], 2048);
    }

    #[test]
    fn search_response_deserializes_features() {
        let json = format!(
            r#"{{"features":[{{"uuid":"{}","label":"whiskers","index_in_sae":123}}]}}"#,
            Uuid::new_v4()
        );
        let response: FeatureSearchResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(response.features.len(), 1);
        assert_eq!(response.features[0].label, "whiskers");
    }

    #[test]
    fn chat_response_extracts_first_choice() {
        let json = r#"{"choices":[{"message":{"content":"a painted cat"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("a painted cat")
        );
    }

    #[test]
    fn feature_displays_as_label() {
        assert_eq!(feature("whiskers").to_string(), "whiskers");
    }
}
