pub mod checkpoint;
pub mod etl;
pub mod loader;
pub mod preflight;
pub mod resolver;
pub mod synthesizer;
pub mod workbook;

pub use crate::domain::model::{Record, RecordTable, ResolvedPlace, Synthesis, SynthesisOutcome};
pub use crate::domain::ports::{PlacesLookup, Storage, TextGenerator};
pub use crate::utils::error::Result;
