use crate::app::sources::{clean_codes, SourceIo};
use crate::core::series::build_series;
use crate::core::{
    Fetcher, Frequency, Pipeline, RawTable, ScrapeOutput, SeriesOutcome, Storage, TableDecoder,
    TableFormat,
};
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::validate_non_empty_list;
use url::Url;

/// 英國國家統計局 (ONS) 的時間序列請求
#[derive(Debug, Clone, PartialEq)]
pub struct OnsRequest {
    pub dataset: String,
    pub series: Vec<String>,
    pub frequency: Frequency,
}

impl OnsRequest {
    /// `dataset` is lower-cased and trimmed, series codes upper-cased with
    /// spaces removed, and `frequency` is one of `A`, `Q`, `M` in any case.
    pub fn new<T: AsRef<str>>(dataset: &str, series: &[T], frequency: &str) -> Result<Self> {
        let series = clean_codes(series);
        validate_non_empty_list("series", &series)?;
        Ok(Self {
            dataset: dataset.trim().to_lowercase(),
            series,
            frequency: frequency.parse()?,
        })
    }

    pub fn url(&self, base_url: &str) -> Result<String> {
        let mut url = Url::parse(base_url).map_err(|e| ScrapeError::InvalidConfigValueError {
            field: "ons.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("dataset", &self.dataset)
            .append_pair("cdid", &self.series.join(","));
        Ok(url.to_string())
    }
}

pub struct OnsSource<F, D, S> {
    io: SourceIo<F, D, S>,
    base_url: String,
    request: OnsRequest,
}

impl<F: Fetcher, D: TableDecoder, S: Storage> OnsSource<F, D, S> {
    pub fn new(io: SourceIo<F, D, S>, base_url: String, request: OnsRequest) -> Self {
        Self {
            io,
            base_url,
            request,
        }
    }

    pub fn url(&self) -> Result<String> {
        self.request.url(&self.base_url)
    }

    /// Downloads and normalizes the series without writing anything.
    pub async fn fetch(&self) -> Result<SeriesOutcome> {
        let raw = self.extract().await?;
        build_series(&raw, self.request.frequency, &self.request.series)
    }
}

#[async_trait::async_trait]
impl<F: Fetcher, D: TableDecoder, S: Storage> Pipeline for OnsSource<F, D, S> {
    fn name(&self) -> String {
        format!(
            "ons_{}_{}",
            self.request.dataset,
            self.request.frequency.code().to_ascii_lowercase()
        )
    }

    async fn extract(&self) -> Result<RawTable> {
        let url = self.url()?;
        tracing::info!("ONS CSV: {}", url);
        self.io.fetch_table(&url, &TableFormat::Csv).await
    }

    async fn transform(&self, raw: RawTable) -> Result<ScrapeOutput> {
        let outcome = build_series(&raw, self.request.frequency, &self.request.series)?;
        Ok(outcome.into())
    }

    async fn load(&self, output: ScrapeOutput) -> Result<String> {
        self.io.write_output(&self.name(), &output).await
    }
}
