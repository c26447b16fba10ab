use crate::app::sources::SourceIo;
use crate::config::toml_config::ImfConfig;
use crate::core::panel::{build_long_panel, build_panel, select_panel, DuplicatePolicy};
use crate::core::{
    Fetcher, Panel, Pipeline, RawTable, ScrapeOutput, Storage, TableDecoder, TableFormat,
};
use crate::utils::error::{Result, ScrapeError};
use std::io::{Cursor, Read};
use std::str::FromStr;

const WEO_ENTITY_COLUMN: &str = "Country";
const WEO_CATEGORY_COLUMN: &str = "WEO Subject Code";
const PUBFIN_ENTITY_COLUMN: &str = "country";
const PUBFIN_TIME_COLUMN: &str = "year";

/// 國際貨幣基金 (IMF) 支援的資料集
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImfDataset {
    /// World Economic Outlook: one row per (country, subject), one column per year.
    Weo,
    /// Public Finances in Modern History: one row per (country, year).
    Pubfin,
}

impl ImfDataset {
    pub fn id(&self) -> &'static str {
        match self {
            ImfDataset::Weo => "weo",
            ImfDataset::Pubfin => "pubfin",
        }
    }
}

impl FromStr for ImfDataset {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weo" => Ok(ImfDataset::Weo),
            "pubfin" => Ok(ImfDataset::Pubfin),
            _ => Err(ScrapeError::UnknownDataset {
                dataset: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImfRequest {
    pub dataset: ImfDataset,
    pub series: Option<Vec<String>>,
    pub countries: Option<Vec<String>>,
}

impl ImfRequest {
    /// Fails with `UnknownDataset` before anything is downloaded.
    pub fn new(
        dataset: &str,
        series: Option<Vec<String>>,
        countries: Option<Vec<String>>,
    ) -> Result<Self> {
        Ok(Self {
            dataset: dataset.parse()?,
            series,
            countries,
        })
    }
}

/// Reads one member out of a zip archive held in memory.
pub fn read_archive_member(bytes: &[u8], member: &str) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut file = archive.by_name(member)?;
    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)?;
    tracing::debug!("Read {} bytes from archive member {}", data.len(), member);
    Ok(data)
}

/// Chooses how to decode an archive member from its extension.
pub fn member_format(member: &str, sheet: &str) -> TableFormat {
    let lower = member.to_lowercase();
    if lower.ends_with(".csv") {
        TableFormat::Csv
    } else if lower.ends_with(".tsv") || lower.ends_with(".txt") {
        TableFormat::Tsv
    } else {
        TableFormat::Spreadsheet {
            sheet: sheet.to_string(),
        }
    }
}

pub struct ImfSource<F, D, S> {
    io: SourceIo<F, D, S>,
    config: ImfConfig,
    policy: DuplicatePolicy,
    request: ImfRequest,
}

impl<F: Fetcher, D: TableDecoder, S: Storage> ImfSource<F, D, S> {
    pub fn new(
        io: SourceIo<F, D, S>,
        config: ImfConfig,
        policy: DuplicatePolicy,
        request: ImfRequest,
    ) -> Self {
        Self {
            io,
            config,
            policy,
            request,
        }
    }

    pub fn url(&self) -> &str {
        match self.request.dataset {
            ImfDataset::Weo => &self.config.weo_url,
            ImfDataset::Pubfin => &self.config.pubfin_url,
        }
    }

    /// Downloads the dataset and returns the (optionally narrowed) panel.
    pub async fn fetch(&self) -> Result<Panel> {
        let raw = self.extract().await?;
        self.build(&raw)
    }

    fn build(&self, raw: &RawTable) -> Result<Panel> {
        let panel = match self.request.dataset {
            ImfDataset::Weo => {
                build_panel(raw, WEO_ENTITY_COLUMN, WEO_CATEGORY_COLUMN, self.policy)?
            }
            ImfDataset::Pubfin => {
                build_long_panel(raw, PUBFIN_ENTITY_COLUMN, PUBFIN_TIME_COLUMN, self.policy)?
            }
        };
        Ok(select_panel(
            &panel,
            self.request.series.as_deref(),
            self.request.countries.as_deref(),
        ))
    }
}

#[async_trait::async_trait]
impl<F: Fetcher, D: TableDecoder, S: Storage> Pipeline for ImfSource<F, D, S> {
    fn name(&self) -> String {
        format!("imf_{}", self.request.dataset.id())
    }

    async fn extract(&self) -> Result<RawTable> {
        let url = self.url().to_string();
        tracing::info!("IMF {} from {}", self.request.dataset.id(), url);
        match self.request.dataset {
            ImfDataset::Weo => self.io.fetch_table(&url, &TableFormat::Tsv).await,
            ImfDataset::Pubfin => {
                let archive = self.io.fetcher.fetch_bytes(&url).await?;
                let member = read_archive_member(&archive, &self.config.pubfin_member)?;
                let format = member_format(&self.config.pubfin_member, &self.config.pubfin_sheet);
                self.io.decoder.parse_table(&member, &format)
            }
        }
    }

    async fn transform(&self, raw: RawTable) -> Result<ScrapeOutput> {
        Ok(ScrapeOutput::Panel(self.build(&raw)?))
    }

    async fn load(&self, output: ScrapeOutput) -> Result<String> {
        self.io.write_output(&self.name(), &output).await
    }
}
