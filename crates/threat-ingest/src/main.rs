mod bootstrap;
mod summary;

use anyhow::{Context, Result};
use clap::Parser;
use threat_core::settings::Settings;
use threat_runtime::charts::JsonChartSink;
use threat_runtime::pipeline::Pipeline;
use threat_runtime::store::SqliteStore;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("Threat ingest v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&settings) {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

fn run(settings: &Settings) -> Result<()> {
    let config = settings.pipeline_config()?;
    let data_dir = settings.resolved_data_dir();
    bootstrap::ensure_directories(&config.output_dir, &data_dir)
        .context("Failed to create output or data directory")?;

    let credentials = settings
        .connection_settings()
        .context("Invalid database connection settings")?;
    tracing::info!("Initializing database connection...");
    let store = SqliteStore::connect(&credentials, &data_dir)
        .with_context(|| format!("Failed to open database '{}'", credentials.db_name))?;

    let charts = JsonChartSink::new(&config.output_dir);
    let top_limit = config.top_limit;
    let pipeline = Pipeline::new(config, store, charts);

    let report = pipeline.run()?;

    print!("{}", summary::render_summary(&report, top_limit));

    if let Some(path) = &settings.report_file {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        tracing::info!("Run report saved to {}", path.display());
    }

    tracing::info!("Threat analysis completed successfully");
    Ok(())
}
