pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "enrich")]
#[command(about = "Enrich business listings with Google Maps data and generated About sections")]
pub struct CliConfig {
    /// Input table (.xlsx or .csv) with Business Name, Address and Telephone columns
    #[arg(long, default_value = "input_businesses.xlsx")]
    pub input: String,

    /// Output table (.xlsx or .csv), overwritten at every checkpoint
    #[arg(long, default_value = "processed_businesses.xlsx")]
    pub output: String,

    /// Optional TOML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Process only the first N records
    #[arg(long)]
    pub limit: Option<usize>,

    /// Answer yes to every prompt and process without asking for a limit
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the API key self-test
    #[arg(long)]
    pub skip_preflight: bool,

    /// Override the pause between records, in milliseconds
    #[arg(long)]
    pub pacing_ms: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory at each checkpoint")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output", &self.output)?;
        validation::validate_table_extension("input", &self.input)?;
        validation::validate_table_extension("output", &self.output)?;
        if let Some(limit) = self.limit {
            validation::validate_positive_number("limit", limit, 1)?;
        }
        if self.input == self.output {
            return Err(crate::utils::error::EnrichError::InvalidConfigValueError {
                field: "output".to_string(),
                value: self.output.clone(),
                reason: "Output must differ from the input file".to_string(),
            });
        }
        Ok(())
    }
}
