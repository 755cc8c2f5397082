use crate::config::toml_config::GeneratorSettings;
use crate::domain::ports::{GenerationParams, PlacesLookup, TextGenerator};

const PLACES_PROBE: &str = "Google Headquarters";
const GENERATOR_PROBE: &str = "Hello, this is a test message.";

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Passed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheck {
    pub service: &'static str,
    pub outcome: CheckOutcome,
}

impl ServiceCheck {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Passed(_))
    }

    fn log(&self) {
        match &self.outcome {
            CheckOutcome::Passed(detail) => tracing::info!("✅ {}: {}", self.service, detail),
            CheckOutcome::Failed(detail) => tracing::error!("❌ {}: {}", self.service, detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreflightReport {
    pub places: ServiceCheck,
    pub generator: ServiceCheck,
}

impl PreflightReport {
    pub fn all_passed(&self) -> bool {
        self.places.passed() && self.generator.passed()
    }

    pub fn log(&self) {
        self.places.log();
        self.generator.log();
        if self.all_passed() {
            tracing::info!("🔑 All API keys are working");
        } else {
            tracing::warn!("⚠️ Some API keys are not working; results may be incomplete");
        }
    }
}

/// Probes the places service with a well-known query. `None` means no key was configured.
pub async fn check_places<P: PlacesLookup>(places: Option<&P>) -> ServiceCheck {
    let service = "Google Maps API";
    let Some(places) = places else {
        return ServiceCheck {
            service,
            outcome: CheckOutcome::Failed("API key not configured".to_string()),
        };
    };

    let outcome = match places.find_place(PLACES_PROBE).await {
        Ok(response) if response.is_ok() => {
            CheckOutcome::Passed("API key is working".to_string())
        }
        Ok(response) => CheckOutcome::Failed(format!(
            "{}: {}",
            response.status,
            response
                .error_message
                .unwrap_or_else(|| "no error message".to_string())
        )),
        Err(e) => CheckOutcome::Failed(e.to_string()),
    };
    ServiceCheck { service, outcome }
}

/// Sends a short prompt to the primary model. On failure the detail lists the
/// models of the configured family that the key can see.
pub async fn check_generator<G: TextGenerator>(
    generator: Option<&G>,
    settings: &GeneratorSettings,
) -> ServiceCheck {
    let service = "Gemini API";
    let Some(generator) = generator else {
        return ServiceCheck {
            service,
            outcome: CheckOutcome::Failed("API key not configured".to_string()),
        };
    };

    let params = GenerationParams {
        max_output_tokens: 20,
        ..settings.params()
    };
    let error = match generator.generate(&settings.model, GENERATOR_PROBE, &params).await {
        Ok(_) => {
            return ServiceCheck {
                service,
                outcome: CheckOutcome::Passed(format!(
                    "API key is working with {}",
                    settings.model
                )),
            }
        }
        Err(e) => e,
    };

    let family = settings.fallback_family.to_lowercase();
    let available = match generator.list_models().await {
        Ok(models) => {
            let matching: Vec<String> = models
                .into_iter()
                .filter(|m| m.to_lowercase().contains(&family))
                .collect();
            if matching.is_empty() {
                format!("no {} models available", family)
            } else {
                format!("available models: {}", matching.join(", "))
            }
        }
        Err(e) => format!("could not list models: {}", e),
    };

    ServiceCheck {
        service,
        outcome: CheckOutcome::Failed(format!("{} ({})", error, available)),
    }
}

pub async fn run_preflight<P: PlacesLookup, G: TextGenerator>(
    places: Option<&P>,
    generator: Option<&G>,
    settings: &GeneratorSettings,
) -> PreflightReport {
    tracing::info!("🧪 Testing API keys...");
    let report = PreflightReport {
        places: check_places(places).await,
        generator: check_generator(generator, settings).await,
    };
    report.log();
    report
}
