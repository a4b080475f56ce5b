use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting merge process...");

        // Extract
        let sources = self.pipeline.extract().await?;
        tracing::info!("Read {} source files", sources.len());
        self.monitor.log_stats("Extract complete");

        // Transform
        let result = self.pipeline.transform(sources).await?;
        tracing::info!(
            "Merged {} records from {} sources ({} skipped)",
            result.records.len(),
            result.sources_processed,
            result.sources_skipped
        );
        self.monitor.log_stats("Transform complete");

        // Load
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Load complete");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
