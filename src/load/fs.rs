use crate::error::EtlResult;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;
use tracing::{debug, error};

/// Write `data` to `path` as pretty-printed JSON, creating parent directories as needed.
pub async fn save_raw_data<T: Serialize>(data: &T, path: impl AsRef<Path>) -> EtlResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut serializer)?;

    tokio::fs::write(path, bytes).await.map_err(|e| {
        error!(filepath = %path.display(), "failed to write raw data: {e}");
        e
    })?;
    debug!(filepath = %path.display(), "raw data saved");
    Ok(())
}
