use crate::core::workbook::{render_xlsx, TableFormat};
use crate::core::{Record, RecordTable, Storage};
use crate::domain::model::{
    COL_ABOUT, COL_ADDRESS, COL_ERROR, COL_MAPS_URL, COL_NAME, COL_PHONE, COL_REVIEW_SCORE,
    COL_STATUS,
};
use crate::utils::error::{EnrichError, Result};
use csv::WriterBuilder;

/// Serializes the whole table in `table.columns` order.
pub fn render_table(table: &RecordTable, format: TableFormat) -> Result<Vec<u8>> {
    match format {
        TableFormat::Csv => render_csv(table),
        TableFormat::Xlsx => render_xlsx(table),
    }
}

fn render_csv(table: &RecordTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&table.columns)?;

    for record in &table.records {
        writer.write_record(
            table
                .columns
                .iter()
                .enumerate()
                .map(|(index, column)| cell_value(record, index, column)),
        )?;
    }

    writer.into_inner().map_err(|e| EnrichError::IoError(e.into_error()))
}

/// Whole scores keep one decimal (`4.0`); anything else is written at full precision.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}

/// Text of the cell at column `index`. Pass-through cells are looked up by position.
pub(crate) fn cell_value(record: &Record, index: usize, column: &str) -> String {
    match column {
        COL_NAME => record.name.clone(),
        COL_ADDRESS => record.address.clone(),
        COL_PHONE => record.phone.clone(),
        COL_MAPS_URL => record.maps_url.clone().unwrap_or_default(),
        COL_REVIEW_SCORE => record.review_score.map(format_score).unwrap_or_default(),
        COL_ABOUT => record.about_text.clone().unwrap_or_default(),
        COL_STATUS => record.status.label().to_string(),
        COL_ERROR => record.error_message.clone().unwrap_or_default(),
        _ => record.passthrough.get(&index).cloned().unwrap_or_default(),
    }
}

/// Overwrites the output table with the current state of the run.
pub struct Checkpointer<S: Storage> {
    storage: S,
    output_path: String,
}

impl<S: Storage> Checkpointer<S> {
    pub fn new(storage: S, output_path: impl Into<String>) -> Self {
        Self {
            storage,
            output_path: output_path.into(),
        }
    }

    pub async fn persist(&self, table: &RecordTable) -> Result<()> {
        let persist_error = |e: EnrichError| EnrichError::Persist {
            path: self.output_path.clone(),
            message: e.to_string(),
        };

        let format = TableFormat::from_path(&self.output_path).ok_or_else(|| {
            persist_error(EnrichError::ValidationError {
                message: "output must be a .csv or .xlsx file".to_string(),
            })
        })?;
        let bytes = render_table(table, format).map_err(persist_error)?;
        self.storage
            .write_file(&self.output_path, &bytes)
            .await
            .map_err(persist_error)?;

        tracing::info!("💾 Results saved to {}", self.output_path);
        Ok(())
    }
}
