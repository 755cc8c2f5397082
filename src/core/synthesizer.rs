use crate::config::toml_config::GeneratorSettings;
use crate::core::{Synthesis, SynthesisOutcome};
use crate::domain::ports::TextGenerator;

pub const PLACEHOLDER_PREFIX: &str = "About section could not be generated. Error: ";

/// Prompt for a ~200 word About section built only from the supplied facts.
pub fn build_prompt(name: &str, address: &str, review_score: f64) -> String {
    format!(
        "Write a professional, engaging 200-word 'About Us' section for a business with the following details:\n\
         - Business Name: {name}\n\
         - Location: {address}\n\
         - Google Review Score: {review_score:.1}\n\
         \n\
         The content should be informative and highlight the business's commitment to quality and customer service. \
         Mention the review score only if it is 4.0 or higher. Keep the tone professional but warm. \
         Do not invent details such as a founding year, specific services or team members; \
         use only the information provided above."
    )
}

/// Caps `text` at `cap` whitespace-separated words, appending `...` when cut.
pub fn truncate_words(text: &str, cap: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > cap {
        format!("{}...", words[..cap].join(" "))
    } else {
        text.trim().to_string()
    }
}

fn model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// First listed model of the configured family that is not the primary model.
pub fn pick_fallback(models: &[String], primary: &str, family: &str) -> Option<String> {
    let family = family.to_lowercase();
    models
        .iter()
        .find(|m| m.to_lowercase().contains(&family) && model_id(m) != model_id(primary))
        .cloned()
}

/// Produces About text for resolved businesses. Never fails: a generation
/// error yields one fallback attempt and then a placeholder string.
pub struct Synthesizer<G: TextGenerator> {
    generator: G,
    settings: GeneratorSettings,
}

impl<G: TextGenerator> Synthesizer<G> {
    pub fn new(generator: G, settings: GeneratorSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn synthesize(&self, name: &str, address: &str, review_score: f64) -> Synthesis {
        let prompt = build_prompt(name, address, review_score);
        let primary = self.settings.model.as_str();

        tracing::debug!("Generating about section using {} model", primary);
        let original_error = match self.attempt(primary, &prompt).await {
            Ok(synthesis) => return synthesis,
            Err(e) => e,
        };
        tracing::warn!("Error generating about section: {}", original_error);

        match self.fallback_model().await {
            Some(fallback) => {
                tracing::info!("🔁 Using fallback model: {}", fallback);
                match self.attempt(&fallback, &prompt).await {
                    Ok(synthesis) => return synthesis,
                    Err(e) => tracing::warn!("Fallback model also failed: {}", e),
                }
            }
            None => tracing::warn!("No fallback model available"),
        }

        Synthesis {
            text: format!("{}{}", PLACEHOLDER_PREFIX, original_error),
            outcome: SynthesisOutcome::Placeholder {
                error: original_error,
            },
        }
    }

    async fn attempt(&self, model: &str, prompt: &str) -> Result<Synthesis, String> {
        let raw = self
            .generator
            .generate(model, prompt, &self.settings.params())
            .await
            .map_err(|e| e.to_string())?;

        let word_count = raw.split_whitespace().count();
        let text = truncate_words(&raw, self.settings.word_cap);
        tracing::info!("✍️ Generated about section: {} words", word_count);

        Ok(Synthesis {
            text,
            outcome: SynthesisOutcome::Generated {
                model: model_id(model).to_string(),
            },
        })
    }

    async fn fallback_model(&self) -> Option<String> {
        match self.generator.list_models().await {
            Ok(models) => pick_fallback(
                &models,
                &self.settings.model,
                &self.settings.fallback_family,
            ),
            Err(e) => {
                tracing::warn!("Could not list available models: {}", e);
                None
            }
        }
    }
}
