use anyhow::Context;
use clap::Parser;
use keyforge::TronGenerator;
use keyforge_pipeline::config::{CliArgs, PipelineConfig};
use keyforge_pipeline::control::sampler::SystemLoadSampler;
use keyforge_pipeline::runtime::Pipeline;
use keyforge_pipeline::shutdown::termination_signal;
use keyforge_pipeline::sink::store::{SqliteStore, Store};
use keyforge_pipeline::telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = PipelineConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let mut store = SqliteStore::open(&config.db_path).with_context(|| {
        format!(
            "failed to open wallet store at {}",
            config.db_path.display()
        )
    })?;
    store
        .ensure_schema()
        .context("failed to create wallet schema")?;
    tracing::info!("Wallet store holds {} wallets", store.count()?);

    let sampler = SystemLoadSampler::new(config.sample_window);
    let report = Pipeline::new(config, TronGenerator::new(), store, sampler)
        .run(termination_signal())
        .await
        .inspect_err(|e| tracing::error!("Pipeline failed: {e}"))
        .context("pipeline failed")?;

    tracing::info!(
        produced = report.produced,
        saved = report.saved,
        flushes = report.flushes,
        "Exited safely"
    );
    Ok(())
}

fn log_startup_info(config: &PipelineConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting keyforge with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting keyforge with {} workers (max {}), target load {}% ± {}",
            config.initial_workers,
            config.max_workers,
            config.control.target_load,
            config.control.load_band
        );
    }
}
