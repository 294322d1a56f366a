use crate::error::EtlResult;
use async_trait::async_trait;

/// Extract the data from some source.
#[async_trait]
pub trait Extract: Sized {
    type Client: Send + Sync;

    /// How is the data extracted?
    async fn extract(client: &Self::Client) -> EtlResult<Self>;
}

/// Load the data to some data store.
///
/// Loading is blocking; the only store in use is a local SQLite file.
pub trait Load {
    type Client;

    /// How is the data loaded?
    fn load(&self, client: &mut Self::Client) -> EtlResult<usize>;
}
