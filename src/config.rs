use crate::extract::opensea::{COLLECTIONS_URL, DEFAULT_CHAIN};
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_DATABASE_PATH: &str = "database/opensea.db";

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Sent as `X-API-KEY`. Left empty when unset; the API will refuse the request.
    pub api_key: String,
    pub chain: String,
    pub api_url: String,
    pub database_path: PathBuf,
    /// Where to snapshot the raw response, if anywhere.
    pub raw_data_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            chain: DEFAULT_CHAIN.to_string(),
            api_url: COLLECTIONS_URL.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            raw_data_path: None,
        }
    }
}

impl Config {
    /// Read the configuration from the environment, after loading any `.env` file.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset or blank keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_key = get("OPENSEA_API_KEY").or_else(|| get("API_KEY"));
        if api_key.is_none() {
            warn!("OPENSEA_API_KEY is not set; requests will not be authenticated");
        }

        Self {
            api_key: api_key.unwrap_or_default(),
            chain: get("OPENSEA_CHAIN").unwrap_or(defaults.chain),
            api_url: get("OPENSEA_API_URL").unwrap_or(defaults.api_url),
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            raw_data_path: get("RAW_DATA_PATH").map(PathBuf::from),
        }
    }
}
