use crate::core::{Pipeline, ScrapeOutput};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract → transform → load. Returns `None` when the source had
    /// no data for the requested frequency; nothing is written in that case.
    pub async fn run(&self) -> Result<Option<String>> {
        let name = self.pipeline.name();
        tracing::info!("🚀 Starting {}", name);

        // Extract
        tracing::info!("📥 Extracting raw table...");
        let raw = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} rows x {} columns",
            raw.len(),
            raw.columns().len()
        );

        // Transform
        tracing::info!("🔄 Normalizing...");
        let output = self.pipeline.transform(raw).await?;
        match &output {
            ScrapeOutput::NoData(freq) => {
                tracing::warn!("⚠️ No {} rows found; nothing to load", freq);
                return Ok(None);
            }
            ScrapeOutput::Series(series) => tracing::info!(
                "Built series with {} periods and {} columns",
                series.len(),
                series.columns().len()
            ),
            ScrapeOutput::Panel(panel) => tracing::info!(
                "Built panel with {} variables, {} entities, {} periods",
                panel.variables().len(),
                panel.entities().len(),
                panel.periods().len()
            ),
        }

        // Load
        tracing::info!("💾 Loading...");
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(Some(output_path))
    }
}
