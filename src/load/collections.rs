use super::sqlite::Store;
use crate::error::{EtlError, EtlResult, SchemaError};
use crate::etl::Load;
use crate::transform::CleanedCollectionRecord;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub const TABLE: &str = "ethereum_collections";

pub const SCHEMA: &str = "
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    name TEXT,
    description TEXT,
    image_url TEXT,
    owner TEXT,
    twitter_username TEXT,
    contracts TEXT,
    owner_collection_count INTEGER
";

/// Added after the fact; may or may not be present already.
pub const EXTRA_COLUMN: (&str, &str) = ("instagram_username", "TEXT");

impl Load for [CleanedCollectionRecord] {
    type Client = Store;

    fn load(&self, client: &mut Self::Client) -> EtlResult<usize> {
        client.create_table(TABLE, SCHEMA)?;

        let (column, data_type) = EXTRA_COLUMN;
        match client.add_column(TABLE, column, data_type) {
            Ok(()) => {}
            Err(EtlError::Schema(SchemaError::DuplicateColumn { .. })) => {
                debug!(table = TABLE, column, "column already present")
            }
            Err(e) => return Err(e),
        }

        if self.is_empty() {
            info!(table = TABLE, "nothing to load");
            return Ok(0);
        }
        client.insert(TABLE, self)
    }
}

/// Load `records` into `ethereum_collections` in the database at `db_path`.
///
/// The table is created if absent and never dropped. On failure the error is logged, any
/// open transaction is rolled back, and the connection is released before the error is
/// returned.
pub fn load_collections(
    db_path: impl AsRef<Path>,
    records: &[CleanedCollectionRecord],
) -> EtlResult<usize> {
    let db_path = db_path.as_ref();
    if let Some(dir) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let mut store = Store::open(db_path)?;

    match records.load(&mut store) {
        Ok(loaded) => {
            store.close()?;
            info!(table = TABLE, path = %db_path.display(), loaded, "collections loaded");
            Ok(loaded)
        }
        Err(e) => {
            error!(table = TABLE, path = %db_path.display(), "Failed to load collections: {e}");
            if let Err(rollback) = store.rollback() {
                warn!("Rollback failed: {rollback}");
            }
            // The load error is the one worth reporting; a close failure is only logged.
            if let Err(close) = store.close() {
                warn!("Failed to close database after load error: {close}");
            }
            Err(e)
        }
    }
}
