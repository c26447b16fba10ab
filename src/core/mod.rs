pub mod coerce;
pub mod date_index;
pub mod etl;
pub mod panel;
pub mod row_filter;
pub mod series;

pub use crate::domain::model::{
    Cell, Frequency, NumericCell, Panel, PanelKey, RawTable, ScrapeOutput, Series, SeriesOutcome,
    TableFormat,
};
pub use crate::domain::ports::{Fetcher, Pipeline, Storage, TableDecoder};
pub use crate::utils::error::Result;
