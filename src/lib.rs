pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, SourceCommand};

pub use adapters::{CsvDecoder, HttpFetcher, LocalStorage, TableReader};
pub use app::sources::{
    boe::{BoeRequest, BoeSource},
    imf::{ImfDataset, ImfRequest, ImfSource},
    ons::{OnsRequest, OnsSource},
    SourceIo,
};
pub use config::{OutputFormat, ScraperConfig};
pub use core::{
    etl::EtlEngine,
    panel::{build_panel, select_panel, DuplicatePolicy},
    series::build_series,
};
pub use domain::model::{
    Cell, Frequency, NumericCell, Panel, RawTable, ScrapeOutput, Series, SeriesOutcome,
};
pub use utils::error::{Result, ScrapeError};
