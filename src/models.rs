use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clients::goodfire::Feature;

pub const CONCEPTS_TABLE: &str = "concepts";
pub const FEATURES_TABLE: &str = "features";
pub const GENERATIONS_TABLE: &str = "generations";
pub const IMAGES_BUCKET: &str = "images";

/// A concept being rendered. Unique by `text`; created lazily, never
/// mutated or deleted by this tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRow {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct NewConcept<'a> {
    pub text: &'a str,
}

/// One cached feature search. Unique by `input_text`; `discovered_features`
/// holds the top-5 ranked descriptors verbatim and is immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub id: Uuid,
    pub input_text: String,
    pub discovered_features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct NewFeatureRow<'a> {
    pub input_text: &'a str,
    pub discovered_features: &'a [Feature],
}

/// One completed sweep step. Append-only; rows sharing
/// (`concept_id`, `feature_id`) differ by `feature_strength`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub concept_id: Uuid,
    pub feature_id: Uuid,
    pub feature_index: u8,
    pub feature_strength: f64,
    pub generated_prompt: String,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct NewGeneration<'a> {
    pub concept_id: Uuid,
    pub feature_id: Uuid,
    pub feature_index: u8,
    pub feature_strength: f64,
    pub generated_prompt: &'a str,
    pub image_url: &'a str,
}

/// Object-store key for one generated image. Deterministic per
/// (concept, feature, strength), so a re-run overwrites its own image.
pub fn image_object_path(concept_id: Uuid, feature_id: Uuid, strength: f64) -> String {
    format!("{concept_id}/{feature_id}_{strength}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_object_path_is_deterministic() {
        let concept_id = Uuid::nil();
        let feature_id = Uuid::nil();
        assert_eq!(
            image_object_path(concept_id, feature_id, 0.5),
            format!("{concept_id}/{feature_id}_0.5.png")
        );
        assert_eq!(
            image_object_path(concept_id, feature_id, 0.5),
            image_object_path(concept_id, feature_id, 0.5)
        );
    }

    #[test]
    fn image_object_path_keeps_sign() {
        let path = image_object_path(Uuid::nil(), Uuid::nil(), -0.25);
        assert!(path.ends_with("_-0.25.png"));
    }

    #[test]
    fn generation_row_round_trips() {
        let json = format!(
            r#"{{
                "id": "{id}",
                "created_at": "2026-08-27T12:00:00Z",
                "concept_id": "{id}",
                "feature_id": "{id}",
                "feature_index": 0,
                "feature_strength": -0.5,
                "generated_prompt": "a painted cat",
                "image_url": "https://abc.supabase.co/storage/v1/object/public/images/x.png"
            }}"#,
            id = Uuid::nil()
        );
        let row: GenerationRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row.feature_strength, -0.5);
        assert_eq!(row.feature_index, 0);
    }
}
