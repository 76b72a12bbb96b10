use crate::embeddings::{embed_checked, Embedder};
use crate::error::{Result, VectorStoreError};
use crate::store::{RetrievalStore, DEFAULT_MAX_BATCH_SIZE};
use crate::types::{FragmentRecord, Metadata, MetadataFilter, QueryMatch};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Client for a Chroma server's v1 REST API.
///
/// Vectors are computed client-side with the injected [`Embedder`], so index
/// and query always share one embedding space.
pub struct ChromaClient {
    http: Client,
    base_url: String,
    embedder: Arc<dyn Embedder>,
    max_batch_size: usize,
    collection_ids: Mutex<HashMap<String, String>>,
}

impl ChromaClient {
    /// Connect and read the server's batch limit from its pre-flight checks.
    pub async fn connect(
        base_url: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder().timeout(timeout).build()?;
        let mut client = Self {
            http,
            base_url,
            embedder,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            collection_ids: Mutex::new(HashMap::new()),
        };
        match client.preflight_batch_size().await {
            Ok(size) => client.max_batch_size = size.max(1),
            Err(err) => log::warn!(
                "Chroma pre-flight check failed ({err}); using batch size {DEFAULT_MAX_BATCH_SIZE}"
            ),
        }
        log::info!(
            "Connected to Chroma at {} (max batch {})",
            client.base_url,
            client.max_batch_size
        );
        Ok(client)
    }

    async fn preflight_batch_size(&self) -> Result<usize> {
        let resp = self
            .http
            .get(format!("{}/api/v1/pre-flight-checks", self.base_url))
            .send()
            .await?;
        let checks: PreflightChecks = checked(resp).await?.json().await?;
        Ok(checks.max_batch_size)
    }

    /// Cached collection id. The lock is not held across the request;
    /// concurrent misses may both call get-or-create, which is idempotent.
    async fn collection_id(&self, name: &str) -> Result<String> {
        if let Some(id) = self.collection_ids.lock().await.get(name) {
            return Ok(id.clone());
        }
        let resp = self
            .http
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&json!({ "name": name, "get_or_create": true }))
            .send()
            .await?;
        let collection: CollectionInfo = checked(resp).await?.json().await?;
        self.collection_ids
            .lock()
            .await
            .insert(name.to_string(), collection.id.clone());
        Ok(collection.id)
    }
}

#[async_trait]
impl RetrievalStore for ChromaClient {
    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn upsert(&self, collection: &str, batch: &[FragmentRecord]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > self.max_batch_size {
            return Err(VectorStoreError::Other(format!(
                "batch of {} exceeds Chroma max batch size {}",
                batch.len(),
                self.max_batch_size
            )));
        }
        for record in batch {
            record.validate()?;
        }

        let contents: Vec<&str> = batch.iter().map(|r| r.content.as_str()).collect();
        let embeddings = embed_checked(self.embedder.as_ref(), &contents).await?;
        let body = UpsertRequest {
            ids: batch.iter().map(|r| r.id.as_str()).collect(),
            embeddings,
            documents: contents,
            metadatas: batch.iter().map(|r| &r.metadata).collect(),
        };

        let id = self.collection_id(collection).await?;
        let resp = self
            .http
            .post(format!("{}/api/v1/collections/{id}/upsert", self.base_url))
            .json(&body)
            .send()
            .await?;
        checked(resp).await?;
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
        let query_embedding = self.embedder.embed(query_text).await?;
        let body = QueryRequest {
            query_embeddings: vec![query_embedding],
            n_results: top_k,
            where_clause: filter.map(where_clause),
            include: &["documents", "metadatas", "distances"],
        };

        let id = self.collection_id(collection).await?;
        let resp = self
            .http
            .post(format!("{}/api/v1/collections/{id}/query", self.base_url))
            .json(&body)
            .send()
            .await?;
        let parsed: QueryResponse = checked(resp).await?.json().await?;
        let mut matches = parsed.into_matches();
        matches.truncate(top_k);
        Ok(matches)
    }
}

async fn checked(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(VectorStoreError::Status {
        status: status.as_u16(),
        body,
    })
}

fn where_clause(filter: &MetadataFilter) -> Value {
    let mut clause = serde_json::Map::new();
    clause.insert(filter.key.clone(), json!({ "$eq": filter.value }));
    Value::Object(clause)
}

#[derive(Debug, Deserialize)]
struct PreflightChecks {
    max_batch_size: usize,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<&'a str>,
    metadatas: Vec<&'a Metadata>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_clause: Option<Value>,
    include: &'a [&'a str],
}

/// Chroma answers one row per query embedding; we always send exactly one.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

impl QueryResponse {
    fn into_matches(self) -> Vec<QueryMatch> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let mut documents = first_row(self.documents).into_iter();
        let mut metadatas = first_row(self.metadatas).into_iter();
        let mut distances = first_row(self.distances).into_iter();

        let mut matches: Vec<QueryMatch> = ids
            .into_iter()
            .map(|id| {
                let content = documents.next().flatten().unwrap_or_default();
                let metadata = metadatas.next().flatten().unwrap_or_default();
                let distance = distances.next().flatten().unwrap_or(f32::MAX);
                QueryMatch {
                    id,
                    content,
                    metadata,
                    score: distance_to_score(distance),
                }
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }
}

fn first_row<T>(rows: Option<Vec<Vec<T>>>) -> Vec<T> {
    rows.and_then(|rows| rows.into_iter().next())
        .unwrap_or_default()
}

/// Monotone map from distance (lower is closer) to score (higher is closer).
fn distance_to_score(distance: f32) -> f32 {
    if !distance.is_finite() || distance < 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + distance)
}
