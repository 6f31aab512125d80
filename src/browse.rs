//! Read path for the browsing UI.
//!
//! The UI is a separate consumer of the persisted schema; these queries are
//! its read-only surface. The client is passed explicitly into each query so
//! its lifecycle belongs to the UI process, not to module globals.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::clients::supabase::SupabaseClient;
use crate::models::{
    CONCEPTS_TABLE, ConceptRow, FEATURES_TABLE, FeatureRow, GENERATIONS_TABLE, GenerationRow,
};

/// All concepts that have been generated for, ordered by text.
pub async fn list_concepts(client: &SupabaseClient) -> anyhow::Result<Vec<ConceptRow>> {
    client.select(CONCEPTS_TABLE, &[], Some("text.asc")).await
}

/// The feature sets referenced by a concept's generations, in first-use
/// order, with duplicates collapsed.
pub async fn feature_sets_for_concept(
    client: &SupabaseClient,
    concept_id: Uuid,
) -> anyhow::Result<Vec<FeatureRow>> {
    let generations: Vec<GenerationRow> = client
        .select_eq(GENERATIONS_TABLE, "concept_id", &concept_id.to_string())
        .await?;

    let mut feature_ids: Vec<Uuid> = Vec::new();
    for generation in &generations {
        if !feature_ids.contains(&generation.feature_id) {
            feature_ids.push(generation.feature_id);
        }
    }

    let mut rows = Vec::with_capacity(feature_ids.len());
    for feature_id in feature_ids {
        let mut matched: Vec<FeatureRow> = client
            .select_eq(FEATURES_TABLE, "id", &feature_id.to_string())
            .await?;
        rows.append(&mut matched);
    }
    Ok(rows)
}

/// Generations for one (concept, feature set) pair, ordered by strength
/// ascending, matching the sweep axis.
pub async fn generations_for(
    client: &SupabaseClient,
    concept_id: Uuid,
    feature_id: Uuid,
) -> anyhow::Result<Vec<GenerationRow>> {
    client
        .select(
            GENERATIONS_TABLE,
            &[
                ("concept_id", concept_id.to_string()),
                ("feature_id", feature_id.to_string()),
            ],
            Some("feature_strength.asc"),
        )
        .await
}

/// The generation whose strength is closest to `target` by absolute
/// difference. `None` only for an empty slice.
pub fn nearest_by_strength(rows: &[GenerationRow], target: f64) -> Option<&GenerationRow> {
    rows.iter().min_by(|a, b| {
        let da = (a.feature_strength - target).abs();
        let db = (b.feature_strength - target).abs();
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    })
}
