use crate::adapters::http::DEFAULT_USER_AGENT;
use crate::core::panel::DuplicatePolicy;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ONS_BASE_URL: &str = "http://www.ons.gov.uk/ons/datasets-and-tables/downloads/csv.csv";
pub const BOE_BASE_URL: &str = "http://www.bankofengland.co.uk/boeapps/iadb/fromshowcolumns.asp";
pub const WEO_URL: &str =
    "http://www.imf.org/external/pubs/ft/weo/2013/02/weodata/WEOOct2013all.xls";
pub const PUBFIN_URL: &str = "http://www.imf.org/external/pubs/ft/wp/2013/data/wp1305.zip";
pub const PUBFIN_MEMBER: &str = "Historical Public Finance Dataset_1.xlsx";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub http: HttpConfig,
    pub ons: OnsConfig,
    pub boe: BoeConfig,
    pub imf: ImfConfig,
    pub panel: PanelConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsConfig {
    pub base_url: String,
}

impl Default for OnsConfig {
    fn default() -> Self {
        Self {
            base_url: ONS_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoeConfig {
    pub base_url: String,
    pub years_back: i32,
}

impl Default for BoeConfig {
    fn default() -> Self {
        Self {
            base_url: BOE_BASE_URL.to_string(),
            years_back: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImfConfig {
    pub weo_url: String,
    pub pubfin_url: String,
    /// Archive member holding the public-finance table. A `.csv` member is
    /// decoded directly; anything else is treated as a workbook.
    pub pubfin_member: String,
    pub pubfin_sheet: String,
    pub na_values: Vec<String>,
}

impl Default for ImfConfig {
    fn default() -> Self {
        Self {
            weo_url: WEO_URL.to_string(),
            pubfin_url: PUBFIN_URL.to_string(),
            pubfin_member: PUBFIN_MEMBER.to_string(),
            pubfin_sheet: "data".to_string(),
            na_values: vec!["n/a".to_string(), "--".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub format: OutputFormat,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            format: OutputFormat::Csv,
        }
    }
}

impl ScraperConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ONS_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScrapeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ScraperConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("ons.base_url", &self.ons.base_url)?;
        validation::validate_url("boe.base_url", &self.boe.base_url)?;
        validation::validate_url("imf.weo_url", &self.imf.weo_url)?;
        validation::validate_url("imf.pubfin_url", &self.imf.pubfin_url)?;
        validation::validate_non_empty_string("imf.pubfin_member", &self.imf.pubfin_member)?;
        validation::validate_non_empty_string("http.user_agent", &self.http.user_agent)?;
        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 3600)?;
        validation::validate_range("boe.years_back", self.boe.years_back, 0, 200)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        Ok(())
    }
}
