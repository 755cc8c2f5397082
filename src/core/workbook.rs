use crate::core::checkpoint::cell_value;
use crate::core::RecordTable;
use crate::domain::model::COL_REVIEW_SCORE;
use crate::utils::error::{EnrichError, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::Cursor;
use std::path::Path;

/// On-disk table formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if ext.eq_ignore_ascii_case("xlsx") {
            Some(Self::Xlsx)
        } else {
            None
        }
    }
}

/// Header row and data rows of the first worksheet, as trimmed text.
/// Rows shorter than the header are padded with empty cells.
pub fn read_xlsx(bytes: &[u8], source: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| EnrichError::load(format!("Invalid workbook '{}': {}", source, e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EnrichError::load(format!("Workbook '{}' has no worksheets", source)))?
        .map_err(|e| EnrichError::load(format!("Unreadable worksheet in '{}': {}", source, e)))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

    let headers = rows
        .next()
        .ok_or_else(|| EnrichError::load(format!("Workbook '{}' has no header row", source)))?;
    let width = headers.len();

    let rows = rows
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();
    Ok((headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Phone numbers typed into Excel come back as whole floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn xlsx_error(e: XlsxError) -> EnrichError {
    EnrichError::workbook(e.to_string())
}

fn position(row: usize, col: usize) -> Result<(u32, u16)> {
    let row = u32::try_from(row)
        .map_err(|_| EnrichError::workbook(format!("row {} is out of range", row)))?;
    let col = u16::try_from(col)
        .map_err(|_| EnrichError::workbook(format!("column {} is out of range", col)))?;
    Ok((row, col))
}

/// Serializes the whole table as a single-sheet workbook in `table.columns` order.
/// Review scores are written as numbers, everything else as text.
pub fn render_xlsx(table: &RecordTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();

        for (col, header) in table.columns.iter().enumerate() {
            let (row, col) = position(0, col)?;
            sheet
                .write_string(row, col, header.as_str())
                .map_err(xlsx_error)?;
        }

        for (record_index, record) in table.records.iter().enumerate() {
            for (col_index, column) in table.columns.iter().enumerate() {
                let (row, col) = position(record_index + 1, col_index)?;
                match (column.as_str(), record.review_score) {
                    (COL_REVIEW_SCORE, Some(score)) => {
                        sheet.write_number(row, col, score).map_err(xlsx_error)?;
                    }
                    _ => {
                        let value = cell_value(record, col_index, column);
                        if !value.is_empty() {
                            sheet
                                .write_string(row, col, value.as_str())
                                .map_err(xlsx_error)?;
                        }
                    }
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}
