use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting leap-year ETL process");

        tracing::info!("Extracting rows...");
        let raw_rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", raw_rows.len());
        self.monitor.log_stats("extract");

        tracing::info!("Classifying and aggregating...");
        let result = self.pipeline.transform(raw_rows).await?;
        tracing::info!(
            "Classified {} years ({} after filter, {} charts)",
            result.records.len(),
            result.filtered.len(),
            result.charts.len()
        );
        self.monitor.log_stats("transform");

        tracing::info!("Writing outputs...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
