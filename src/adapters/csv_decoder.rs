use crate::core::{Cell, RawTable, TableDecoder, TableFormat};
use crate::utils::error::{Result, ScrapeError};
use csv::ReaderBuilder;

/// 解析 CSV／TSV 為原始表格
///
/// Every field is kept as text; blank fields and configured NA markers
/// become `Cell::Empty`. Bytes that are not valid UTF-8 are decoded lossily.
#[derive(Debug, Clone, Default)]
pub struct CsvDecoder {
    na_values: Vec<String>,
}

impl CsvDecoder {
    pub fn new(na_values: Vec<String>) -> Self {
        Self { na_values }
    }

    fn to_cell(&self, field: &[u8]) -> Cell {
        let text = String::from_utf8_lossy(field);
        let trimmed = text.trim();
        if trimmed.is_empty() || self.na_values.iter().any(|na| na == trimmed) {
            Cell::Empty
        } else {
            Cell::Text(text.into_owned())
        }
    }
}

impl TableDecoder for CsvDecoder {
    fn parse_table(&self, bytes: &[u8], format: &TableFormat) -> Result<RawTable> {
        let delimiter = match format {
            TableFormat::Csv => b',',
            TableFormat::Tsv => b'\t',
            TableFormat::Spreadsheet { sheet } => {
                return Err(ScrapeError::DecodeError {
                    message: format!(
                        "spreadsheet decoding (sheet '{}') is not supported by the CSV decoder",
                        sheet
                    ),
                });
            }
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();
        if columns.is_empty() {
            return Err(ScrapeError::DecodeError {
                message: "table has no header row".to_string(),
            });
        }

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(record.iter().map(|f| self.to_cell(f)).collect());
        }

        tracing::debug!("Decoded table with {} columns and {} rows", columns.len(), rows.len());
        Ok(RawTable::new(columns, rows))
    }
}
