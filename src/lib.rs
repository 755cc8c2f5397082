pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{gemini::GeminiClient, places::GooglePlacesClient};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::etl::{EnrichEngine, RunSummary};
pub use utils::error::{EnrichError, Result};
