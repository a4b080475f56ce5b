use anyhow::Context;
use market_etl::utils::{logger, validation::Validate};
use market_etl::{EtlEngine, LocalCollection, LocalStorage, MergePipeline, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    logger::init_cli_logger(false);
    tracing::info!("Loading pipeline config from {}", config_path);

    let config = TomlConfig::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path))?;
    tracing::info!(
        "Pipeline: {} v{} - {}",
        config.pipeline.name,
        config.pipeline.version,
        config.pipeline.description
    );

    let provider = config.resolve();
    provider.validate().context("invalid configuration")?;

    let collection = LocalCollection::new(provider.input_dir.clone());
    let storage = LocalStorage::new(provider.output_path.clone());
    let monitor_enabled = provider.monitoring;
    let pipeline = MergePipeline::new(collection, storage, provider);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    let output_path = engine.run().await?;

    println!("✅ Merge completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}
