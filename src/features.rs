use tracing::debug;
use uuid::Uuid;

use crate::clients::goodfire::{BASE_MODEL, Feature, GoodfireClient, Variant};
use crate::clients::supabase::SupabaseClient;
use crate::error::{ApiError, StoreError};
use crate::models::{FEATURES_TABLE, FeatureRow, NewFeatureRow};

/// How many ranked matches a feature search requests and caches.
pub const TOP_K: usize = 5;

/// Memoized lookup of feature sets, keyed by the free-text search input.
///
/// A search runs at most once per distinct input: the ranked results are
/// cached verbatim in the `features` table and every later resolve of the
/// same text is served from the store.
pub struct FeatureManager<'a> {
    goodfire: &'a GoodfireClient,
    supabase: &'a SupabaseClient,
}

impl<'a> FeatureManager<'a> {
    pub fn new(goodfire: &'a GoodfireClient, supabase: &'a SupabaseClient) -> Self {
        Self { goodfire, supabase }
    }

    /// Resolve `feature_input` to its cached feature set, searching and
    /// caching on first use. Returns the feature-set id, the highest-ranked
    /// descriptor, and a fresh variant to steer.
    pub async fn find_or_create_feature(
        &self,
        feature_input: &str,
    ) -> anyhow::Result<(Uuid, Feature, Variant)> {
        let variant = Variant::new(BASE_MODEL);

        let cached: Vec<FeatureRow> = self
            .supabase
            .select_eq(FEATURES_TABLE, "input_text", feature_input)
            .await?;

        if let Some(row) = cached.into_iter().next() {
            debug!(feature_id = %row.id, input = feature_input, "feature cache hit");
            let feature = row
                .discovered_features
                .into_iter()
                .next()
                .ok_or(StoreError::EmptyFeatureSet(row.id))?;
            return Ok((row.id, feature, variant));
        }

        debug!(input = feature_input, "feature cache miss, searching");
        let features = self
            .goodfire
            .search_features(feature_input, &variant, TOP_K)
            .await?;
        let primary = features
            .first()
            .cloned()
            .ok_or(ApiError::EmptyResponse { service: "goodfire" })?;

        // Unique on input_text; merge-on-conflict makes a concurrent insert
        // of the same input return the winning row instead of failing.
        let row: FeatureRow = self
            .supabase
            .upsert(
                FEATURES_TABLE,
                "input_text",
                &NewFeatureRow {
                    input_text: feature_input,
                    discovered_features: &features,
                },
            )
            .await?;

        Ok((row.id, primary, variant))
    }

    /// Re-read the cached descriptor sequence for display.
    pub async fn get_discovered_features(&self, feature_id: Uuid) -> anyhow::Result<Vec<Feature>> {
        let rows: Vec<FeatureRow> = self
            .supabase
            .select_eq(FEATURES_TABLE, "id", &feature_id.to_string())
            .await?;
        rows.into_iter()
            .next()
            .map(|row| row.discovered_features)
            .ok_or_else(|| StoreError::FeatureSetNotFound(feature_id).into())
    }
}
