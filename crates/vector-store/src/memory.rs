use crate::embeddings::{cosine_similarity, embed_checked, Embedder};
use crate::error::Result;
use crate::store::{RetrievalStore, DEFAULT_MAX_BATCH_SIZE};
use crate::types::{FragmentRecord, MetadataFilter, QueryMatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct StoredFragment {
    record: FragmentRecord,
    vector: Vec<f32>,
}

/// Fragments in insertion order plus an id index into them.
#[derive(Default)]
struct Collection {
    fragments: Vec<StoredFragment>,
    positions: HashMap<String, usize>,
}

impl Collection {
    fn upsert(&mut self, record: FragmentRecord, vector: Vec<f32>) {
        match self.positions.get(&record.id) {
            Some(&index) => self.fragments[index] = StoredFragment { record, vector },
            None => {
                self.positions.insert(record.id.clone(), self.fragments.len());
                self.fragments.push(StoredFragment { record, vector });
            }
        }
    }
}

/// Process-local store: brute-force cosine search over embedded fragments.
///
/// Unknown collections behave as empty ones.
pub struct InMemoryStore {
    embedder: Arc<dyn Embedder>,
    collections: RwLock<HashMap<String, Collection>>,
    max_batch_size: usize,
}

impl InMemoryStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    /// Number of fragments stored in `collection`
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |stored| stored.fragments.len())
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    /// Get all fragment ids of `collection`, in insertion order
    pub async fn ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|stored| {
                stored
                    .fragments
                    .iter()
                    .map(|s| s.record.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl RetrievalStore for InMemoryStore {
    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn upsert(&self, collection: &str, batch: &[FragmentRecord]) -> Result<()> {
        for record in batch {
            record.validate()?;
        }
        let contents: Vec<&str> = batch.iter().map(|r| r.content.as_str()).collect();
        let vectors = embed_checked(self.embedder.as_ref(), &contents).await?;

        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();
        for (record, vector) in batch.iter().cloned().zip(vectors) {
            stored.upsert(record, vector);
        }
        log::debug!(
            "Upserted {} records into '{collection}' (total {})",
            batch.len(),
            stored.fragments.len()
        );
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed(query_text).await?;

        let collections = self.collections.read().await;
        let Some(stored) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<QueryMatch> = stored
            .fragments
            .iter()
            .filter(|s| filter.map_or(true, |f| f.matches(&s.record.metadata)))
            .map(|s| QueryMatch {
                id: s.record.id.clone(),
                content: s.record.content.clone(),
                metadata: s.record.metadata.clone(),
                score: cosine_similarity(&query_vector, &s.vector),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);
        Ok(matches)
    }
}
