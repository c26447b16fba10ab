pub mod boe;
pub mod imf;
pub mod ons;

use crate::app::output::render;
use crate::config::OutputFormat;
use crate::core::{Fetcher, RawTable, ScrapeOutput, Storage, TableDecoder, TableFormat};
use crate::utils::error::Result;

/// 資料來源共用的外部協作者：下載、解析、輸出
pub struct SourceIo<F, D, S> {
    pub fetcher: F,
    pub decoder: D,
    pub storage: S,
    pub output_path: String,
    pub format: OutputFormat,
}

impl<F: Fetcher, D: TableDecoder, S: Storage> SourceIo<F, D, S> {
    pub fn new(
        fetcher: F,
        decoder: D,
        storage: S,
        output_path: String,
        format: OutputFormat,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            storage,
            output_path,
            format,
        }
    }

    pub async fn fetch_table(&self, url: &str, format: &TableFormat) -> Result<RawTable> {
        let bytes = self.fetcher.fetch_bytes(url).await?;
        self.decoder.parse_table(&bytes, format)
    }

    /// Serializes `output` and writes it as `<name>.<ext>`; returns the path.
    pub async fn write_output(&self, name: &str, output: &ScrapeOutput) -> Result<String> {
        let file_name = format!("{}.{}", name, self.format.extension());
        let data = render(output, self.format)?;
        tracing::debug!("Writing {} ({} bytes) to storage", file_name, data.len());
        self.storage.write_file(&file_name, &data).await?;
        Ok(format!("{}/{}", self.output_path, file_name))
    }
}

/// Upper-cases codes and strips embedded spaces, dropping empty entries.
pub fn clean_codes<T: AsRef<str>>(codes: &[T]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.as_ref().to_uppercase().replace(' ', ""))
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{Fetcher, Storage};
    use crate::utils::error::{Result, ScrapeError};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Serves canned bodies by URL and records every request.
    #[derive(Clone, Default)]
    pub struct MockFetcher {
        bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockFetcher {
        pub async fn serve(&self, url: &str, body: &[u8]) {
            self.bodies.lock().await.insert(url.to_string(), body.to_vec());
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.lock().await.push(url.to_string());
            self.bodies
                .lock()
                .await
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::TransportError {
                    url: url.to_string(),
                    message: "not found".to_string(),
                })
        }
    }

    #[derive(Clone, Default)]
    pub struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }
}
