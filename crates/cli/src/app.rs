use crate::config::FileConfig;
use anyhow::{Context, Result};
use clap::ValueEnum;
use sitelens_analysis::{GeminiClient, ModelClient, PageSpeedClient, Pipeline, RouteAnalyzer};
use sitelens_discovery::{HttpSiteClient, RouteDiscovery};
use sitelens_indexer::{CodeIndexer, GitCli};
use sitelens_search::CodeRetriever;
use sitelens_vector_store::{
    ChromaClient, Embedder, GeminiEmbedder, HashingEmbedder, InMemoryStore, RetrievalStore,
};
use std::sync::Arc;
use std::time::Duration;

const EMBEDDING_MODEL: &str = "text-embedding-004";
const STORE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Process-local store; the index lives only for this invocation
    Memory,
    /// Chroma server at --chroma-url
    Chroma,
}

/// Credentials and endpoints, usually from the environment.
#[derive(Debug, Clone)]
pub struct Services {
    pub pagespeed_key: Option<String>,
    pub gemini_key: Option<String>,
    pub gemini_model: String,
    pub store: StoreKind,
    pub chroma_url: String,
}

impl Services {
    fn gemini_key(&self) -> Option<&str> {
        self.gemini_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        match self.gemini_key() {
            Some(key) => Ok(Arc::new(GeminiEmbedder::new(key, EMBEDDING_MODEL, STORE_TIMEOUT)?)),
            None => {
                log::warn!("GEMINI_API_KEY not set, using local hashing embeddings");
                Ok(Arc::new(HashingEmbedder::default()))
            }
        }
    }

    pub async fn store(&self) -> Result<Arc<dyn RetrievalStore>> {
        let embedder = self.embedder()?;
        Ok(match self.store {
            StoreKind::Memory => Arc::new(InMemoryStore::new(embedder)),
            StoreKind::Chroma => Arc::new(
                ChromaClient::connect(&self.chroma_url, embedder, STORE_TIMEOUT)
                    .await
                    .with_context(|| {
                        format!("Failed to connect to Chroma at {}", self.chroma_url)
                    })?,
            ),
        })
    }

    fn model(&self, timeout: Duration) -> Result<Arc<dyn ModelClient>> {
        let key = self
            .gemini_key()
            .context("GEMINI_API_KEY is required for analysis")?;
        Ok(Arc::new(GeminiClient::new(key, &self.gemini_model, timeout)?))
    }
}

pub fn discovery(config: &FileConfig) -> Result<RouteDiscovery> {
    let client = Arc::new(HttpSiteClient::new(&config.discovery)?);
    Ok(RouteDiscovery::new(client.clone(), client, config.discovery.clone())?)
}

pub fn indexer(config: &FileConfig, store: Arc<dyn RetrievalStore>) -> Result<CodeIndexer> {
    Ok(CodeIndexer::new(
        store,
        Arc::new(GitCli::default()),
        config.indexer.clone(),
    )?)
}

/// Full pipeline; the indexer is attached only when a repository will be analyzed.
pub async fn pipeline(
    config: &FileConfig,
    services: &Services,
    with_repository: bool,
) -> Result<Pipeline> {
    let analysis = config.analysis.clone();
    let model = services.model(analysis.analysis_timeout)?;
    let metrics = Arc::new(PageSpeedClient::new(services.pagespeed_key.clone())?);
    if services
        .pagespeed_key
        .as_deref()
        .map_or(true, |key| key.trim().is_empty())
    {
        log::warn!("PAGESPEED_API_KEY not set, every route will fall back to placeholder insights");
    }

    let (retriever, indexer) = if with_repository {
        let store = services.store().await?;
        (
            Some(CodeRetriever::new(store.clone())),
            Some(indexer(config, store)?),
        )
    } else {
        (None, None)
    };

    let analyzer = RouteAnalyzer::new(model, retriever, &analysis);
    let pipeline = Pipeline::new(discovery(config)?, metrics, analyzer, analysis)?;
    Ok(match indexer {
        Some(indexer) => pipeline.with_indexer(indexer),
        None => pipeline,
    })
}
