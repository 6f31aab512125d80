use std::io::Cursor;
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;
use uuid::Uuid;

use crate::clients::supabase::SupabaseClient;
use crate::models::{
    CONCEPTS_TABLE, ConceptRow, GENERATIONS_TABLE, GenerationRow, IMAGES_BUCKET, NewConcept,
    NewGeneration, image_object_path,
};

/// Persists the output of one sweep step: the concept row, the image blob
/// (local mirror + object store), and the generation record.
pub struct StorageManager<'a> {
    supabase: &'a SupabaseClient,
    http: reqwest::Client,
    local_root: PathBuf,
}

impl<'a> StorageManager<'a> {
    pub fn new(supabase: &'a SupabaseClient) -> Self {
        Self::with_local_root(supabase, PathBuf::from("images"))
    }

    /// Override the local mirror directory (tests use a temp dir).
    pub fn with_local_root(supabase: &'a SupabaseClient, local_root: PathBuf) -> Self {
        Self {
            supabase,
            http: crate::clients::http_client(),
            local_root,
        }
    }

    /// Save concept and generation data for one sweep step.
    ///
    /// Steps run in order with no rollback: a failed insert after a
    /// successful upload leaves the uploaded blob in place.
    pub async fn save_concept_and_generation(
        &self,
        concept: &str,
        feature_id: Uuid,
        feature_index: u8,
        feature_strength: f64,
        generated_prompt: &str,
        image_url: &str,
    ) -> anyhow::Result<Uuid> {
        // Unique on text; merge-on-conflict returns the existing row when the
        // concept was already created by an earlier run.
        let concept_row: ConceptRow = self
            .supabase
            .upsert(CONCEPTS_TABLE, "text", &NewConcept { text: concept })
            .await?;
        debug!(concept_id = %concept_row.id, concept, "concept resolved");

        let response = self
            .http
            .get(image_url)
            .send()
            .await
            .context("image download failed")?;
        if !response.status().is_success() {
            return Err(crate::clients::api_error("image download", response).await);
        }
        let bytes = response
            .bytes()
            .await
            .context("image download body read failed")?;

        let decoded =
            image::load_from_memory(&bytes).context("downloaded image could not be decoded")?;
        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("PNG encode failed")?;

        let object_path = image_object_path(concept_row.id, feature_id, feature_strength);

        // Local mirror first; kept on disk after upload, never read back.
        let local_path = self.local_root.join(&object_path);
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {} failed", parent.display()))?;
        }
        tokio::fs::write(&local_path, &png)
            .await
            .with_context(|| format!("writing {} failed", local_path.display()))?;

        self.supabase
            .upload_object(IMAGES_BUCKET, &object_path, png, "image/png")
            .await?;
        let public_url = self.supabase.public_url(IMAGES_BUCKET, &object_path);

        let generation: GenerationRow = self
            .supabase
            .insert(
                GENERATIONS_TABLE,
                &NewGeneration {
                    concept_id: concept_row.id,
                    feature_id,
                    feature_index,
                    feature_strength,
                    generated_prompt,
                    image_url: &public_url,
                },
            )
            .await?;
        debug!(generation_id = %generation.id, %public_url, "generation saved");

        Ok(generation.id)
    }
}
