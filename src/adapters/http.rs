use crate::config::toml_config::HttpConfig;
use crate::core::Fetcher;
use crate::utils::error::{Result, ScrapeError};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "statscraper/0.1";

/// 以 reqwest 下載原始檔案
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_seconds: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl TryFrom<&HttpConfig> for HttpFetcher {
    type Error = ScrapeError;

    fn try_from(config: &HttpConfig) -> Result<Self> {
        Self::new(config.timeout_seconds, &config.user_agent)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Making request to: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::TransportError {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(ScrapeError::TransportError {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
