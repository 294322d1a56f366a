use crate::config::Config;
use crate::error::EtlResult;
use crate::etl::Extract;
use crate::extract::fs::read_raw_data;
use crate::extract::opensea::{OpenSeaClient, RawCollectionsResponse};
use crate::load::collections::load_collections;
use crate::load::fs::save_raw_data;
use crate::transform::transform;
use tracing::{info, warn};

/// Record counts at each stage of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub transformed: usize,
    pub loaded: usize,
}

/// Extract, snapshot (if configured), transform and load, once.
///
/// Extraction and transformation errors stop the run before anything is written.
pub async fn run(config: &Config) -> EtlResult<RunSummary> {
    let client = OpenSeaClient::new(&config.api_key)
        .with_url(&config.api_url)
        .with_chain(&config.chain);

    info!(chain = %config.chain, "extracting collections");
    let raw = RawCollectionsResponse::extract(&client).await?;

    if let Some(path) = &config.raw_data_path {
        save_raw_data(&raw, path).await?;
        info!(filepath = %path.display(), "raw data saved");
    }

    transform_and_load(config, &raw)
}

/// Transform and load the snapshot at `raw_data_path`, without touching the network.
///
/// A missing snapshot (or no snapshot path at all) is an empty run, not an error.
pub async fn replay(config: &Config) -> EtlResult<RunSummary> {
    let Some(path) = &config.raw_data_path else {
        warn!("RAW_DATA_PATH is not set; nothing to replay");
        return Ok(RunSummary::default());
    };

    match read_raw_data::<RawCollectionsResponse>(path).await? {
        Some(raw) => transform_and_load(config, &raw),
        None => Ok(RunSummary::default()),
    }
}

fn transform_and_load(config: &Config, raw: &RawCollectionsResponse) -> EtlResult<RunSummary> {
    let records = transform(raw)?;
    let loaded = load_collections(&config.database_path, &records)?;

    let summary = RunSummary {
        fetched: raw.len(),
        transformed: records.len(),
        loaded,
    };
    info!(
        fetched = summary.fetched,
        transformed = summary.transformed,
        loaded = summary.loaded,
        "pipeline finished"
    );
    Ok(summary)
}
