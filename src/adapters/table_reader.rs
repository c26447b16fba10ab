use crate::adapters::CsvDecoder;
#[cfg(feature = "excel")]
use crate::adapters::WorkbookDecoder;
use crate::core::{RawTable, TableDecoder, TableFormat};
use crate::utils::error::Result;

/// 依格式分派到文字或活頁簿解析器
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    text: CsvDecoder,
    #[cfg(feature = "excel")]
    workbook: WorkbookDecoder,
}

impl TableReader {
    pub fn new(na_values: Vec<String>) -> Self {
        Self {
            #[cfg(feature = "excel")]
            workbook: WorkbookDecoder::new(na_values.clone()),
            text: CsvDecoder::new(na_values),
        }
    }
}

impl TableDecoder for TableReader {
    fn parse_table(&self, bytes: &[u8], format: &TableFormat) -> Result<RawTable> {
        match format {
            #[cfg(feature = "excel")]
            TableFormat::Spreadsheet { .. } => self.workbook.parse_table(bytes, format),
            // without `excel` the text decoder reports spreadsheets as unsupported
            _ => self.text.parse_table(bytes, format),
        }
    }
}
