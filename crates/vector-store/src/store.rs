use crate::error::Result;
use crate::types::{FragmentRecord, MetadataFilter, QueryMatch};
use async_trait::async_trait;

/// Batch size assumed when a backend does not advertise its own limit.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;

/// A collection-scoped store of fragments searchable by natural-language text.
#[async_trait]
pub trait RetrievalStore: Send + Sync {
    /// Largest batch a single `upsert` call accepts.
    fn max_batch_size(&self) -> usize {
        DEFAULT_MAX_BATCH_SIZE
    }

    /// Insert or replace `batch`. Implementations validate every record first
    /// and reject the whole batch if any record is malformed.
    async fn upsert(&self, collection: &str, batch: &[FragmentRecord]) -> Result<()>;

    /// At most `top_k` matches, most relevant first.
    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryMatch>>;
}
