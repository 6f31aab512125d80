use anyhow::anyhow;
use console::style;
use tracing::debug;
use uuid::Uuid;

use crate::clients::fal::FalClient;
use crate::clients::goodfire::GoodfireClient;
use crate::error::ValidationError;
use crate::features::FeatureManager;
use crate::prompt::{generate_prompt, prompt_template};
use crate::storage::StorageManager;

/// Arguments for one `generate` invocation, validated before any external
/// call is made.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub concept: String,
    pub feature_input: String,
    pub variations: usize,
    pub min_strength: f64,
    pub max_strength: f64,
    pub feature_index: u8,
    pub verbose: bool,
}

/// `n` evenly spaced values spanning `[min, max]` inclusive.
/// `n == 1` evaluates at `min` only; `n == 0` yields no samples.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![min];
    }
    let step = (max - min) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { max } else { min + step * i as f64 })
        .collect()
}

/// Sweep the strength range, driving one full
/// resolve → prompt → image → persist cycle per value, strictly in order.
pub async fn run_generate(
    goodfire: &GoodfireClient,
    fal: &FalClient,
    features: &FeatureManager<'_>,
    storage: &StorageManager<'_>,
    params: &GenerateParams,
) -> anyhow::Result<()> {
    if params.variations < 1 {
        return Err(ValidationError::Variations.into());
    }
    let strengths = linspace(params.min_strength, params.max_strength, params.variations);
    let total = strengths.len();

    for (step, strength) in strengths.iter().enumerate() {
        println!(
            "{} processing strength {strength:.2}",
            style(format!("[{}/{total}]", step + 1)).cyan().bold()
        );
        let generation_id =
            generate_and_save(goodfire, fal, features, storage, params, *strength).await?;
        if params.verbose {
            println!(
                "{} {generation_id}",
                style("generated and saved with ID:").green()
            );
        }
    }

    Ok(())
}

/// Generate a prompt and image for one strength value, then save both.
async fn generate_and_save(
    goodfire: &GoodfireClient,
    fal: &FalClient,
    features: &FeatureManager<'_>,
    storage: &StorageManager<'_>,
    params: &GenerateParams,
    strength: f64,
) -> anyhow::Result<Uuid> {
    progress("finding/creating feature...");
    let (feature_id, feature, mut variant) =
        features.find_or_create_feature(&params.feature_input).await?;

    let all_features = features.get_discovered_features(feature_id).await?;
    debug!(?all_features, "discovered features");

    progress("generating prompt...");
    let messages = prompt_template(&params.concept);
    let generated_prompt = generate_prompt(
        goodfire,
        &mut variant,
        std::slice::from_ref(&feature),
        &messages,
        strength,
    )
    .await?;

    progress("generating image...");
    let image_result = fal.generate_image(&generated_prompt).await?;
    let image = image_result
        .images
        .first()
        .ok_or_else(|| anyhow!("failed to generate image"))?;
    debug!(image_url = %image.url, "image generated");

    progress("saving to database...");
    storage
        .save_concept_and_generation(
            &params.concept,
            feature_id,
            params.feature_index,
            strength,
            &generated_prompt,
            &image.url,
        )
        .await
}

/// Resolve a feature input (searching and caching on first use) and print
/// its discovered descriptors, indexed by rank.
pub async fn run_list_features(
    features: &FeatureManager<'_>,
    feature_input: &str,
    verbose: bool,
) -> anyhow::Result<()> {
    progress("looking up features...");
    let (feature_id, _, _) = features.find_or_create_feature(feature_input).await?;
    let discovered = features.get_discovered_features(feature_id).await?;

    if verbose {
        println!("\n{}", style("Discovered features:").bold());
    }
    for (i, feature) in discovered.iter().enumerate() {
        println!("{i}: {feature}");
    }

    Ok(())
}

fn progress(step: &str) {
    eprintln!("  {}", style(step).dim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_zero_samples_is_empty() {
        assert!(linspace(-0.5, 0.5, 0).is_empty());
    }

    #[test]
    fn linspace_single_sample_is_min() {
        assert_eq!(linspace(-0.5, 0.5, 1), vec![-0.5]);
    }

    #[test]
    fn linspace_two_samples_are_the_bounds() {
        assert_eq!(linspace(-0.5, 0.5, 2), vec![-0.5, 0.5]);
    }

    #[test]
    fn linspace_three_samples_span_inclusive() {
        assert_eq!(linspace(-0.5, 0.5, 3), vec![-0.5, 0.0, 0.5]);
    }

    #[test]
    fn linspace_is_evenly_spaced() {
        let values = linspace(-0.5, 0.5, 5);
        assert_eq!(values.len(), 5);
        for pair in values.windows(2) {
            assert!((pair[1] - pair[0] - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn linspace_last_sample_is_exactly_max() {
        let values = linspace(-0.5, 0.1, 7);
        assert_eq!(*values.last().unwrap(), 0.1);
    }

    #[test]
    fn linspace_degenerate_range_repeats_value() {
        assert_eq!(linspace(0.25, 0.25, 3), vec![0.25, 0.25, 0.25]);
    }
}
