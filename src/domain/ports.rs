use crate::domain::model::{RawTable, ScrapeOutput, TableFormat};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 取得原始位元組（網路或其他來源）
pub trait Fetcher: Send + Sync {
    fn fetch_bytes(&self, url: &str)
        -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait TableDecoder: Send + Sync {
    fn parse_table(&self, bytes: &[u8], format: &TableFormat) -> Result<RawTable>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Human readable name used in logs and output file names.
    fn name(&self) -> String;
    async fn extract(&self) -> Result<RawTable>;
    async fn transform(&self, raw: RawTable) -> Result<ScrapeOutput>;
    async fn load(&self, output: ScrapeOutput) -> Result<String>;
}
