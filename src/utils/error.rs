use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Load error: {message}")]
    Load { message: String },

    #[error("Places lookup failed: {message}")]
    Lookup { message: String },

    #[error("Text generation failed: {message}")]
    Generation { message: String },

    #[error("Failed to persist results to '{path}': {message}")]
    Persist { path: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Spreadsheet error: {message}")]
    WorkbookError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Service,
    Storage,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EnrichError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn workbook(message: impl Into<String>) -> Self {
        Self::WorkbookError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Load { .. } | Self::CsvError(_) | Self::WorkbookError { .. } => {
                ErrorCategory::Input
            }
            Self::ApiError(_) => ErrorCategory::Network,
            Self::Lookup { .. } | Self::Generation { .. } => ErrorCategory::Service,
            Self::Persist { .. } | Self::IoError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::ValidationError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Swallowed per variant / per record / per checkpoint by the engine.
            Self::Lookup { .. } | Self::Generation { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::Persist { .. } => ErrorSeverity::Medium,
            Self::Load { .. }
            | Self::CsvError(_)
            | Self::WorkbookError { .. }
            | Self::SerializationError(_)
            | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check that the input file exists, is valid CSV or XLSX and has the columns 'Business Name', 'Address' and 'Telephone'"
            }
            ErrorCategory::Network => "Check network connectivity and retry the run",
            ErrorCategory::Service => {
                "Check the API keys (GOOGLE_MAPS_API_KEY, GEMINI_API_KEY) and the service quotas"
            }
            ErrorCategory::Storage => {
                "Check that the output location is writable and the file is not open in another program"
            }
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Data => "Inspect the offending data and correct it before retrying",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Load { message } => format!("Could not load input data: {}", message),
            Self::Persist { path, .. } => format!("Could not save results to '{}'", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;
