use crate::error::{EtlError, EtlResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, trace};

/// Extension of HTTP data-fetching methods for clients.
#[async_trait]
pub trait HttpExtractExt<T: Send + Sync + DeserializeOwned> {
    async fn fetch<Q>(&self, url: &str, query: &Q, headers: HeaderMap) -> EtlResult<T>
    where
        Q: Serialize + Sync + ?Sized;
}

#[async_trait]
impl<T: Send + Sync + DeserializeOwned> HttpExtractExt<T> for reqwest::Client {
    async fn fetch<Q>(&self, url: &str, query: &Q, headers: HeaderMap) -> EtlResult<T>
    where
        Q: Serialize + Sync + ?Sized,
    {
        let data = get(self, url, query, headers).await?;
        Ok(data)
    }
}

/// Send a HTTP GET request, using a referenced [`reqwest::Client`] and a URL.
///
/// Anything but `200 OK` is an [`EtlError::Extraction`] carrying the status; the body of a
/// failed response is only logged. There is no retry.
pub async fn get<T, Q>(
    client: &reqwest::Client,
    url: &str,
    query: &Q,
    headers: HeaderMap,
) -> EtlResult<T>
where
    T: DeserializeOwned,
    Q: Serialize + ?Sized,
{
    let response = client
        .get(url)
        .query(query)
        .headers(headers)
        .send()
        .await
        .map_err(|e| {
            error!(url = %url, "Failed to send GET request: {e}");
            e
        })?;

    let status = response.status();
    trace!(url = %url, status = %status, "received response");

    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        error!(url = %url, status = %status, body = %body, "Failed to fetch data");
        return Err(EtlError::Extraction { status });
    }

    let data: T = response.json().await.map_err(|e| {
        error!(url = %url, "Failed to deserialize JSON: {e}");
        e
    })?;

    Ok(data)
}
