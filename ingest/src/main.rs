use envconfig::Envconfig;
use eyre::Result;

use ingest::config::Config;
use ingest::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let report = pipeline::run(&config).await?;

    tracing::info!(
        raw = report.raw,
        normalized = report.normalized,
        unique = report.unique,
        inserted = report.inserted,
        "pipeline run complete"
    );

    Ok(())
}
