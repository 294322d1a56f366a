use super::http::HttpExtractExt;
use crate::error::EtlResult;
use crate::etl::Extract;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const COLLECTIONS_URL: &str = "https://api.opensea.io/api/v2/collections";
pub const DEFAULT_CHAIN: &str = "ethereum";

const X_API_KEY: &str = "x-api-key";

/// The body of a `GET /collections` response.
///
/// Anything besides `collections` (e.g. the `next` cursor) is kept in `extra` so that a
/// snapshot of the response is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCollectionsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<RawCollectionRecord>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One element of the `collections` array, exactly as the API sent it.
///
/// Fields are left as loose JSON: absent fields are `Null`, and nothing is validated until
/// the transform step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCollectionRecord {
    #[serde(default)]
    pub collection: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub image_url: Value,
    #[serde(default)]
    pub owner: Value,
    #[serde(default)]
    pub twitter_username: Value,
    #[serde(default)]
    pub contracts: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawCollectionsResponse {
    pub fn len(&self) -> usize {
        self.collections.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Client for the marketplace's collections endpoint.
#[derive(Debug, Clone)]
pub struct OpenSeaClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    chain: String,
}

impl OpenSeaClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: COLLECTIONS_URL.to_string(),
            api_key: api_key.into(),
            chain: DEFAULT_CHAIN.to_string(),
        }
    }

    /// Point the client at another collections endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = chain.into();
        self
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        match HeaderValue::from_str(&self.api_key) {
            Ok(key) => {
                headers.insert(X_API_KEY, key);
            }
            // The API rejects the request on its own; no point failing here.
            Err(e) => warn!("API key is not a valid header value, sending without it: {e}"),
        }
        headers
    }

    /// Fetch the collections listed on `chain`.
    pub async fn collections(&self, chain: &str) -> EtlResult<RawCollectionsResponse> {
        debug!(url = %self.url, chain = %chain, "fetching collections");
        let data: RawCollectionsResponse = self
            .http
            .fetch(&self.url, &[("chain", chain)], self.headers())
            .await?;
        debug!(chain = %chain, count = data.len(), "collections fetched");
        Ok(data)
    }
}

#[async_trait]
impl Extract for RawCollectionsResponse {
    type Client = OpenSeaClient;

    async fn extract(client: &Self::Client) -> EtlResult<Self> {
        client.collections(client.chain()).await
    }
}

/// Fetch the collections listed on `chain`, authenticating with `api_key`.
pub async fn extract_collections(api_key: &str, chain: &str) -> EtlResult<RawCollectionsResponse> {
    OpenSeaClient::new(api_key).collections(chain).await
}
