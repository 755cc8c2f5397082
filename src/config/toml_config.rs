use crate::domain::ports::GenerationParams;
use crate::utils::error::{EnrichError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const PLACES_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

/// Settings file for an enrichment run. Every section and field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub places: PlacesSettings,
    pub generator: GeneratorSettings,
    pub run: RunSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesSettings {
    /// Base URL of the Places web service (`.../maps/api/place`).
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://maps.googleapis.com/maps/api/place".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Base URL of the Generative Language API (`.../v1beta`).
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Substring a listed model must contain to be used as a fallback.
    pub fallback_family: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub word_cap: usize,
    pub timeout_seconds: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            fallback_family: "gemini".to_string(),
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            max_output_tokens: params.max_output_tokens,
            word_cap: 220,
            timeout_seconds: 30,
        }
    }
}

impl GeneratorSettings {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Persist after every record whose zero-based index is a multiple of this.
    pub checkpoint_every: usize,
    /// Pause after each record, in milliseconds.
    pub pacing_ms: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            checkpoint_every: 5,
            pacing_ms: 2000,
        }
    }
}

impl RunSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl TomlConfig {
    /// Loads settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EnrichError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EnrichError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EnrichError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Fills API keys the file left out (or left as an unresolved `${VAR}`)
    /// from the process environment.
    pub fn with_env_credentials(mut self) -> Self {
        self.places.api_key = usable_key(self.places.api_key.take())
            .or_else(|| usable_key(std::env::var(PLACES_KEY_VAR).ok()));
        self.generator.api_key = usable_key(self.generator.api_key.take())
            .or_else(|| usable_key(std::env::var(GEMINI_KEY_VAR).ok()));
        self
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("places.endpoint", &self.places.endpoint)?;
        validation::validate_url("generator.endpoint", &self.generator.endpoint)?;
        validation::validate_non_empty_string("generator.model", &self.generator.model)?;
        validation::validate_range("generator.temperature", self.generator.temperature, 0.0, 2.0)?;
        validation::validate_range("generator.top_p", self.generator.top_p, 0.0, 1.0)?;
        validation::validate_positive_number(
            "generator.max_output_tokens",
            self.generator.max_output_tokens as usize,
            1,
        )?;
        validation::validate_positive_number("generator.word_cap", self.generator.word_cap, 1)?;
        validation::validate_positive_number("run.checkpoint_every", self.run.checkpoint_every, 1)?;
        Ok(())
    }
}

fn usable_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && !k.starts_with("${"))
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
