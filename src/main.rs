use anyhow::{Context, Result};
use opensea_etl::{Config, pipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env();
    let replay = std::env::args().skip(1).any(|arg| arg == "--replay");

    let summary = if replay {
        pipeline::replay(&config)
            .await
            .context("failed to replay raw collections snapshot")?
    } else {
        pipeline::run(&config)
            .await
            .with_context(|| format!("ETL run for chain {} failed", config.chain))?
    };

    tracing::info!(
        fetched = summary.fetched,
        transformed = summary.transformed,
        loaded = summary.loaded,
        "done"
    );
    Ok(())
}
