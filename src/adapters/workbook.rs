use crate::core::{Cell, RawTable, TableDecoder, TableFormat};
use crate::utils::error::{Result, ScrapeError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// 解析 Excel／ODS 活頁簿中的單一工作表
///
/// The first row of the sheet is the header. Numbers stay numbers, text
/// matching a configured NA marker and error cells (`#N/A`, `#DIV/0!`)
/// become `Cell::Empty`.
#[derive(Debug, Clone, Default)]
pub struct WorkbookDecoder {
    na_values: Vec<String>,
}

impl WorkbookDecoder {
    pub fn new(na_values: Vec<String>) -> Self {
        Self { na_values }
    }

    fn to_cell(&self, data: &Data) -> Cell {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || self.na_values.iter().any(|na| na == trimmed) {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            Data::Empty | Data::Error(_) => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }

    fn read_sheet(&self, bytes: &[u8], sheet: &str) -> Result<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
            ScrapeError::DecodeError {
                message: format!("could not open workbook: {}", e),
            }
        })?;

        let sheet_names = workbook.sheet_names();
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| ScrapeError::DecodeError {
                message: format!(
                    "sheet '{}' not readable ({}); available: {:?}",
                    sheet, e, sheet_names
                ),
            })?;

        let mut rows = range.rows();
        let columns: Vec<String> = rows
            .next()
            .ok_or_else(|| ScrapeError::DecodeError {
                message: format!("sheet '{}' is empty", sheet),
            })?
            .iter()
            .map(|h| self.to_cell(h).as_label().unwrap_or_default())
            .collect();
        let rows: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(|c| self.to_cell(c)).collect())
            .collect();

        tracing::debug!(
            "Decoded sheet '{}' with {} columns and {} rows",
            sheet,
            columns.len(),
            rows.len()
        );
        Ok(RawTable::new(columns, rows))
    }
}

impl TableDecoder for WorkbookDecoder {
    fn parse_table(&self, bytes: &[u8], format: &TableFormat) -> Result<RawTable> {
        match format {
            TableFormat::Spreadsheet { sheet } => self.read_sheet(bytes, sheet),
            other => Err(ScrapeError::DecodeError {
                message: format!("{:?} is not a workbook format", other),
            }),
        }
    }
}
