// Adapters layer: concrete implementations of the domain ports.

pub mod csv_decoder;
pub mod http;
pub mod storage;
pub mod table_reader;
#[cfg(feature = "excel")]
pub mod workbook;

pub use csv_decoder::CsvDecoder;
pub use http::HttpFetcher;
pub use storage::LocalStorage;
pub use table_reader::TableReader;
#[cfg(feature = "excel")]
pub use workbook::WorkbookDecoder;
