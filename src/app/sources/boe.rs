use crate::app::sources::{clean_codes, SourceIo};
use crate::core::series::build_dated_series;
use crate::core::{
    Fetcher, Pipeline, RawTable, ScrapeOutput, Series, Storage, TableDecoder, TableFormat,
};
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::validate_non_empty_list;
use chrono::{Datelike, Local, NaiveDate};
use url::Url;

/// Date layouts seen in the first column of Bank of England downloads.
const BOE_DATE_FORMATS: &[&str] = &["%d %b %Y", "%Y-%m-%d", "%d/%m/%Y"];

/// The date `years_back` years before `today`. 29 February falls back to
/// 28 February when the target year is not a leap year.
pub fn initial_date(today: NaiveDate, years_back: i32) -> Result<NaiveDate> {
    let year = today.year() - years_back;
    today
        .with_year(year)
        .or_else(|| today.pred_opt()?.with_year(year))
        .ok_or_else(|| ScrapeError::InvalidConfigValueError {
            field: "years_back".to_string(),
            value: years_back.to_string(),
            reason: "date out of range".to_string(),
        })
}

/// 英格蘭銀行 (BoE) 互動資料庫的請求
#[derive(Debug, Clone, PartialEq)]
pub struct BoeRequest {
    pub series: Vec<String>,
    pub date_from: NaiveDate,
    /// Include provisional data.
    pub vpd: bool,
}

impl BoeRequest {
    pub fn new<T: AsRef<str>>(
        series: &[T],
        date_from: Option<NaiveDate>,
        years_back: i32,
        vpd: bool,
    ) -> Result<Self> {
        let series = clean_codes(series);
        validate_non_empty_list("series", &series)?;
        let date_from = match date_from {
            Some(date) => date,
            None => initial_date(Local::now().date_naive(), years_back)?,
        };
        Ok(Self {
            series,
            date_from,
            vpd,
        })
    }

    pub fn url(&self, base_url: &str) -> Result<String> {
        let mut url = Url::parse(base_url).map_err(|e| ScrapeError::InvalidConfigValueError {
            field: "boe.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("csv.x", "yes")
            .append_pair("Datefrom", &self.date_from.format("%d/%b/%Y").to_string())
            .append_pair("Dateto", "now")
            .append_pair("SeriesCodes", &self.series.join(","))
            .append_pair("UsingCodes", "Y")
            .append_pair("CSVF", "TN")
            .append_pair("VPD", if self.vpd { "Y" } else { "N" });
        Ok(url.to_string())
    }
}

pub struct BoeSource<F, D, S> {
    io: SourceIo<F, D, S>,
    base_url: String,
    request: BoeRequest,
}

impl<F: Fetcher, D: TableDecoder, S: Storage> BoeSource<F, D, S> {
    pub fn new(io: SourceIo<F, D, S>, base_url: String, request: BoeRequest) -> Self {
        Self {
            io,
            base_url,
            request,
        }
    }

    pub fn url(&self) -> Result<String> {
        self.request.url(&self.base_url)
    }

    pub async fn fetch(&self) -> Result<Series> {
        let raw = self.extract().await?;
        build_dated_series(&raw, BOE_DATE_FORMATS, &self.request.series)
    }
}

#[async_trait::async_trait]
impl<F: Fetcher, D: TableDecoder, S: Storage> Pipeline for BoeSource<F, D, S> {
    fn name(&self) -> String {
        format!("boe_{}", self.request.series.join("_").to_lowercase())
    }

    async fn extract(&self) -> Result<RawTable> {
        let url = self.url()?;
        tracing::info!("CSV retrieved from {}", url);
        self.io.fetch_table(&url, &TableFormat::Csv).await
    }

    async fn transform(&self, raw: RawTable) -> Result<ScrapeOutput> {
        let series = build_dated_series(&raw, BOE_DATE_FORMATS, &self.request.series)?;
        Ok(ScrapeOutput::Series(series))
    }

    async fn load(&self, output: ScrapeOutput) -> Result<String> {
        self.io.write_output(&self.name(), &output).await
    }
}
