use crate::core::workbook::{read_xlsx, TableFormat};
use crate::core::{Record, RecordTable, Storage};
use crate::domain::model::{
    ProcessingStatus, COL_ABOUT, COL_ADDRESS, COL_ERROR, COL_MAPS_URL, COL_NAME, COL_PHONE,
    COL_REVIEW_SCORE, COL_STATUS, REQUIRED_COLUMNS,
};
use crate::utils::error::{EnrichError, Result};
use csv::{ReaderBuilder, Trim};

/// Reads the input table through `storage`.
///
/// Fails with [`EnrichError::Load`] when the file is missing, has no data rows,
/// lacks a required column, or is not a well-formed CSV or XLSX table.
pub async fn load_table<S: Storage>(storage: &S, path: &str) -> Result<RecordTable> {
    if !storage.exists(path).await {
        return Err(EnrichError::load(format!("Input file '{}' not found", path)));
    }

    let bytes = storage
        .read_file(path)
        .await
        .map_err(|e| EnrichError::load(format!("Failed to read '{}': {}", path, e)))?;

    let table = parse_table(&bytes, path)?;
    tracing::info!("📥 Loaded {} business records from {}", table.len(), path);
    Ok(table)
}

/// Parses table bytes into a [`RecordTable`]. The format follows the extension of
/// `source`, which otherwise only appears in error messages.
pub fn parse_table(bytes: &[u8], source: &str) -> Result<RecordTable> {
    let (headers, rows) = match TableFormat::from_path(source) {
        Some(TableFormat::Csv) => read_csv(bytes, source)?,
        Some(TableFormat::Xlsx) => read_xlsx(bytes, source)?,
        None => {
            return Err(EnrichError::load(format!(
                "Unsupported table format for '{}'; expected .csv or .xlsx",
                source
            )))
        }
    };

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        return Err(EnrichError::load(format!(
            "Required columns {:?} not found in input file '{}'",
            missing, source
        )));
    }

    if rows.is_empty() {
        return Err(EnrichError::load(format!(
            "Input file '{}' contains no data",
            source
        )));
    }

    let records = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| record_from_row(&headers, row, row_index))
        .collect();
    Ok(RecordTable::new(headers, records))
}

fn read_csv(bytes: &[u8], source: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EnrichError::load(format!("Invalid header row in '{}': {}", source, e)))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            EnrichError::load(format!(
                "Malformed row {} in '{}': {}",
                row_index + 1,
                source,
                e
            ))
        })?;
        rows.push(row.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

fn record_from_row(headers: &[String], row: &[String], row_index: usize) -> Record {
    let cell = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or_default()
    };
    let optional = |name: &str| Some(cell(name)).filter(|v| !v.is_empty()).map(str::to_string);

    let mut record = Record::new(cell(COL_NAME), cell(COL_ADDRESS), cell(COL_PHONE));

    // Values from a previous run survive for rows this run does not reach.
    record.maps_url = optional(COL_MAPS_URL);
    record.review_score = optional(COL_REVIEW_SCORE).and_then(|s| s.parse::<f64>().ok());
    record.about_text = optional(COL_ABOUT);
    record.error_message = optional(COL_ERROR);
    record.status = cell(COL_STATUS).parse().unwrap_or_else(|e| {
        tracing::warn!("Row {}: {}, treating as Pending", row_index + 1, e);
        ProcessingStatus::Pending
    });

    record.passthrough = headers
        .iter()
        .zip(row)
        .enumerate()
        .filter(|(_, (name, _))| !is_managed_column(name))
        .map(|(index, (_, value))| (index, value.clone()))
        .collect();

    record
}

fn is_managed_column(name: &str) -> bool {
    matches!(
        name,
        COL_NAME
            | COL_ADDRESS
            | COL_PHONE
            | COL_MAPS_URL
            | COL_REVIEW_SCORE
            | COL_ABOUT
            | COL_STATUS
            | COL_ERROR
    )
}
