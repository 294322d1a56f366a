use crate::error::EtlResult;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{trace, warn};

/// Reads a `.json` file from `path`.
///
/// A missing file is not an error: it yields `None`.
pub async fn read_raw_data<T: DeserializeOwned>(path: impl AsRef<Path>) -> EtlResult<Option<T>> {
    let path = path.as_ref();
    trace!(filepath = %path.display(), "reading file");

    let file = match tokio::fs::read(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(filepath = %path.display(), "file not found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    trace!(filepath = %path.display(), "file read - deserializing bytes");
    let data: T = serde_json::from_slice(&file)?;
    Ok(Some(data))
}
