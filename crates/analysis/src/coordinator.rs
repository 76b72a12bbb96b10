use crate::clients::MetricsClient;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::orchestrator::RouteAnalyzer;
use crate::runner::BoundedRunner;
use serde_json::Value;
use sitelens_discovery::RouteDiscovery;
use sitelens_indexer::{CodeIndexer, IndexStats};
use sitelens_protocol::{Insight, INTERNAL_ERROR_STEP};
use std::sync::Arc;

/// Drives one analysis run: optional indexing, discovery, metrics, analysis.
pub struct Pipeline {
    discovery: RouteDiscovery,
    indexer: Option<CodeIndexer>,
    metrics: Arc<dyn MetricsClient>,
    analyzer: Arc<RouteAnalyzer>,
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(
        discovery: RouteDiscovery,
        metrics: Arc<dyn MetricsClient>,
        analyzer: RouteAnalyzer,
        config: AnalysisConfig,
    ) -> Result<Self> {
        config.validate().map_err(AnalysisError::InvalidConfig)?;
        Ok(Self {
            discovery,
            indexer: None,
            metrics,
            analyzer: Arc::new(analyzer),
            config,
        })
    }

    /// Index repositories before analysis. The indexer and the analyzer's
    /// retriever have to share a store.
    #[must_use]
    pub fn with_indexer(mut self, indexer: CodeIndexer) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// One insight per discovered route, in discovery order.
    ///
    /// Per-route problems degrade to fallback insights; only discovery
    /// errors are returned.
    pub async fn run(
        &self,
        site_url: &str,
        project_name: &str,
        repo_url: Option<&str>,
    ) -> Result<Vec<Insight>> {
        let collection = match repo_url {
            Some(repo_url) => self.index(repo_url, project_name).await,
            None => None,
        };

        let mut routes = self.discovery.discover(site_url).await?.routes;
        routes.truncate(self.config.route_cap);
        log::info!("Analyzing {} routes of {site_url}", routes.len());

        let profiles = self.fetch_profiles(&routes).await;
        let insights = self.analyze_routes(routes, profiles, collection).await;

        let fallbacks = insights.iter().filter(|i| i.is_fallback()).count();
        log::info!(
            "Finished {site_url}: {} insights, {fallbacks} fallbacks",
            insights.len()
        );
        Ok(insights)
    }

    /// Collection name on success; indexing failures only cost code context.
    async fn index(&self, repo_url: &str, project_name: &str) -> Option<String> {
        let Some(indexer) = &self.indexer else {
            log::warn!(
                "Repository {repo_url} given but no indexer configured, skipping code context"
            );
            return None;
        };
        let collection = collection_name(project_name);
        match index_into(indexer, repo_url, &collection).await {
            Ok(stats) => {
                log::info!(
                    "Indexed {repo_url} into '{collection}': {} files, {} fragments",
                    stats.files,
                    stats.fragments
                );
                Some(collection)
            }
            Err(e) => {
                log::warn!("Indexing {repo_url} failed ({e}), continuing without code context");
                None
            }
        }
    }

    async fn fetch_profiles(&self, routes: &[String]) -> Vec<Option<Value>> {
        let runner =
            BoundedRunner::new(self.config.metrics_concurrency, self.config.metrics_timeout);
        let results = runner
            .run(routes.to_vec(), |route| {
                let metrics = Arc::clone(&self.metrics);
                async move { metrics.fetch(&route).await.map_err(anyhow::Error::from) }
            })
            .await;

        routes
            .iter()
            .zip(results)
            .map(|(route, result)| match result {
                Ok(profile) => Some(profile),
                Err(e) => {
                    log::warn!("{route}: metrics unavailable ({e})");
                    None
                }
            })
            .collect()
    }

    async fn analyze_routes(
        &self,
        routes: Vec<String>,
        profiles: Vec<Option<Value>>,
        collection: Option<String>,
    ) -> Vec<Insight> {
        let runner =
            BoundedRunner::new(self.config.analysis_concurrency, self.config.analysis_timeout);
        let items: Vec<(String, Option<Value>)> = routes.iter().cloned().zip(profiles).collect();

        let results = runner
            .run(items, |(route, profile)| {
                let analyzer = Arc::clone(&self.analyzer);
                let collection = collection.clone();
                async move {
                    Ok(analyzer
                        .analyze(&route, profile.as_ref(), collection.as_deref())
                        .await)
                }
            })
            .await;

        routes
            .into_iter()
            .zip(results)
            .map(|(route, result)| {
                result.unwrap_or_else(|e| {
                    log::warn!("{route}: {e}, emitting fallback");
                    Insight::fallback(route, INTERNAL_ERROR_STEP)
                })
            })
            .collect()
    }
}

async fn index_into(
    indexer: &CodeIndexer,
    repo_url: &str,
    collection: &str,
) -> Result<IndexStats> {
    Ok(indexer.index_repository(repo_url, collection).await?)
}

/// Store collection for a project: lowercase ASCII alphanumerics and single
/// dashes, 3 to 63 characters.
pub fn collection_name(project_name: &str) -> String {
    let mut name = String::with_capacity(project_name.len());
    for ch in project_name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            name.push(ch.to_ascii_lowercase());
        } else if !name.ends_with('-') {
            name.push('-');
        }
    }
    let name = name.trim_matches('-');
    let mut name = match name.len() {
        0 => "sitelens-project".to_string(),
        1 | 2 => format!("project-{name}"),
        _ => name.to_string(),
    };
    name.truncate(63);
    name.trim_end_matches('-').to_string()
}
