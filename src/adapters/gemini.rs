//! Gemini (Generative Language API) client used by the synthesizer.

use crate::domain::ports::{GenerationParams, TextGenerator};
use crate::utils::error::{EnrichError, Result};
use crate::utils::logger::redact;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    fn can_generate(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Accepts both `gemini-2.0-flash` and the listed form `models/gemini-2.0-flash`.
    fn model_path(model: &str) -> &str {
        model.strip_prefix("models/").unwrap_or(model)
    }

    /// Turns a non-2xx response into a generation error carrying the service's own message.
    fn api_error(&self, status: reqwest::StatusCode, body: &str) -> EnrichError {
        let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(kind) => format!("{} ({})", envelope.error.message, kind),
                None => envelope.error.message,
            },
            Err(_) => body.to_string(),
        };
        EnrichError::generation(format!(
            "HTTP {}: {}",
            status,
            redact(&detail, &self.api_key)
        ))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            Self::model_path(model)
        );
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_output_tokens,
            },
        };

        tracing::debug!("Gemini request: {}", url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| EnrichError::generation(redact(&e.to_string(), &self.api_key)))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(self.api_error(status, &text));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;

        let candidate = match parsed.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(EnrichError::generation(format!(
                    "Empty response from {}: {}",
                    model, reason
                )));
            }
        };

        let generated: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if generated.trim().is_empty() {
            return Err(EnrichError::generation(format!(
                "Empty response from {} (finish reason: {})",
                model,
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(generated)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("pageSize", "1000")])
            .send()
            .await
            .map_err(|e| EnrichError::generation(redact(&e.to_string(), &self.api_key)))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(self.api_error(status, &text));
        }

        let list: ModelList = serde_json::from_str(&text)?;
        Ok(list
            .models
            .into_iter()
            .filter(ModelInfo::can_generate)
            .map(|m| m.name)
            .collect())
    }
}
