use tracing::{debug, info};

use crate::clients::goodfire::{ChatMessage, Feature, GoodfireClient, Variant};

/// Fixed single-turn template steering generation toward a prompt for
/// `concept` and nothing else.
pub fn prompt_template(concept: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Design a prompt for the following: \"{concept}\"\nDo not generate anything else."
    ))]
}

/// Apply `strength` uniformly to every descriptor as a steering edit on the
/// variant. This mutates the variant's weight map, not the prompt text.
pub fn apply_strengths(variant: &mut Variant, features: &[Feature], strength: f64) {
    for feature in features {
        variant.set(feature, strength);
    }
}

/// Generate a single prompt with the given feature strength.
pub async fn generate_prompt(
    client: &GoodfireClient,
    variant: &mut Variant,
    features: &[Feature],
    messages: &[ChatMessage],
    strength: f64,
) -> anyhow::Result<String> {
    info!(
        prompt = %messages.first().map_or("", |m| m.content.as_str()),
        ?features,
        strength,
        "generating prompt"
    );
    apply_strengths(variant, features, strength);

    let generated_prompt = client.chat_completion(variant, messages).await?;
    debug!(%generated_prompt, "prompt generated");
    Ok(generated_prompt)
}
