use crate::config::{OutputFormat, ScraperConfig};
use crate::utils::error::{Result, ScrapeError};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "statscraper")]
#[command(about = "Download ONS, Bank of England and IMF statistics as tidy tables")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Override [load] output_path
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override [load] format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print the download URL before fetching
    #[arg(long)]
    pub print_url: bool,

    #[command(subcommand)]
    pub command: SourceCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SourceCommand {
    /// Time series from the Office for National Statistics
    Ons {
        /// Dataset abbreviation, e.g. qna, lms, mm23
        #[arg(long)]
        dataset: String,

        /// Series codes, e.g. YBHA,ABMI
        #[arg(long, value_delimiter = ',', required = true)]
        series: Vec<String>,

        /// Frequency: A, Q or M
        #[arg(long, default_value = "Q")]
        freq: String,
    },
    /// Series from the Bank of England interactive database
    Boe {
        #[arg(long, value_delimiter = ',', required = true)]
        series: Vec<String>,

        /// First date, YYYY-MM-DD. Defaults to --years-back years ago.
        #[arg(long)]
        date_from: Option<NaiveDate>,

        #[arg(long)]
        years_back: Option<i32>,

        /// Include provisional data (y/n)
        #[arg(long, default_value = "y", value_parser = parse_flag, action = clap::ArgAction::Set)]
        vpd: bool,
    },
    /// Panels from the IMF (weo or pubfin)
    Imf {
        #[arg(long)]
        dataset: String,

        /// Subject codes to keep; all when omitted
        #[arg(long, value_delimiter = ',')]
        series: Vec<String>,

        /// Country names to keep (repeatable); all when omitted
        #[arg(long = "country")]
        countries: Vec<String>,
    },
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" => Ok(false),
        other => Err(format!("expected y or n, got '{}'", other)),
    }
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋
    pub fn load_config(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::from_file(path).map_err(|e| ScrapeError::ConfigError {
                message: format!("failed to load '{}': {}", path, e),
            })?,
            None => ScraperConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if let Some(format) = self.format {
            config.load.format = format;
        }
        if let SourceCommand::Boe {
            years_back: Some(years),
            ..
        } = &self.command
        {
            config.boe.years_back = *years;
        }
        Ok(config)
    }
}
