use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const COL_NAME: &str = "Business Name";
pub const COL_ADDRESS: &str = "Address";
pub const COL_PHONE: &str = "Telephone";
pub const COL_MAPS_URL: &str = "Google Maps URL";
pub const COL_REVIEW_SCORE: &str = "Review Score";
pub const COL_ABOUT: &str = "About Section";
pub const COL_STATUS: &str = "Processing Status";
pub const COL_ERROR: &str = "Error Message";

pub const REQUIRED_COLUMNS: [&str; 3] = [COL_NAME, COL_ADDRESS, COL_PHONE];
pub const OUTPUT_COLUMNS: [&str; 5] = [
    COL_MAPS_URL,
    COL_REVIEW_SCORE,
    COL_ABOUT,
    COL_STATUS,
    COL_ERROR,
];

pub const NOT_FOUND_MESSAGE: &str = "Could not find business on Google Maps";
pub const NO_SCORE_MESSAGE: &str = "Google Maps listing has no review score";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Success,
    PartialNoMapsData,
    PartialNoDescription,
    Failed,
}

impl ProcessingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Success => "Success",
            Self::PartialNoMapsData => "Partial - No Maps Data",
            Self::PartialNoDescription => "Partial - No Description",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" | "Pending" => Ok(Self::Pending),
            "Success" => Ok(Self::Success),
            "Partial - No Maps Data" => Ok(Self::PartialNoMapsData),
            "Partial - No Description" => Ok(Self::PartialNoDescription),
            "Failed" => Ok(Self::Failed),
            other => Err(format!("unknown processing status '{}'", other)),
        }
    }
}

/// One business row. Identity is the row position inside its [`RecordTable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub maps_url: Option<String>,
    pub review_score: Option<f64>,
    pub about_text: Option<String>,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
    /// Input cells outside the required and output columns, keyed by column
    /// position in [`RecordTable::columns`]. Headers may repeat.
    pub passthrough: HashMap<usize, String>,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn mark_success(&mut self, maps_url: String, review_score: f64, about_text: String) {
        self.maps_url = Some(maps_url);
        self.review_score = Some(review_score);
        self.about_text = Some(about_text);
        self.status = ProcessingStatus::Success;
        self.error_message = None;
    }

    pub fn mark_partial(
        &mut self,
        status: ProcessingStatus,
        maps_url: Option<String>,
        review_score: Option<f64>,
        message: impl Into<String>,
    ) {
        self.maps_url = maps_url;
        self.review_score = review_score;
        self.about_text = None;
        self.status = status;
        self.error_message = Some(message.into());
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.about_text = None;
        self.status = ProcessingStatus::Failed;
        self.error_message = Some(message.into());
    }
}

/// The whole table for one run, mutated in place by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    /// Output header row: input headers in input order, then any missing output columns.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordTable {
    pub fn new(input_headers: Vec<String>, records: Vec<Record>) -> Self {
        let mut columns = input_headers;
        for column in REQUIRED_COLUMNS.iter().chain(OUTPUT_COLUMNS.iter()) {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// A place resolved by the places service.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub maps_url: Option<String>,
    pub review_score: Option<f64>,
    /// Query variant that produced the match.
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    Generated { model: String },
    Placeholder { error: String },
}

/// Synthesizer result. `text` is always populated, even when generation failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub text: String,
    pub outcome: SynthesisOutcome,
}

impl Synthesis {
    pub fn is_generated(&self) -> bool {
        matches!(self.outcome, SynthesisOutcome::Generated { .. })
    }
}
