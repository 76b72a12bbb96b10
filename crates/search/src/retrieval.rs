use crate::error::{Result, SearchError};
use crate::query::build_query_text;
use serde::{Deserialize, Serialize};
use sitelens_protocol::TrimmedProfile;
use sitelens_vector_store::{Metadata, MetadataFilter, QueryMatch, RetrievalStore};
use std::sync::Arc;
use url::Url;

/// A fragment returned for a route, most relevant first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedFragment {
    pub fragment_id: String,
    pub content: String,
    pub metadata: Metadata,
    pub relevance_score: f32,
}

impl RetrievedFragment {
    pub fn relative_path(&self) -> Option<&str> {
        self.metadata.get("relative_path").and_then(|v| v.as_str())
    }

    pub fn start_line(&self) -> Option<u64> {
        self.metadata.get("start_line").and_then(|v| v.as_u64())
    }

    pub fn end_line(&self) -> Option<u64> {
        self.metadata.get("end_line").and_then(|v| v.as_u64())
    }
}

impl From<QueryMatch> for RetrievedFragment {
    fn from(m: QueryMatch) -> Self {
        Self {
            fragment_id: m.id,
            content: m.content,
            metadata: m.metadata,
            relevance_score: m.score,
        }
    }
}

/// Path component of a route with the trailing slash removed, root excepted.
///
/// Accepts absolute URLs (`https://site.dev/blog/`) and bare paths (`/blog/`).
pub fn normalize_route_path(route: &str) -> String {
    let path = match Url::parse(route) {
        Ok(url) => url.path().to_string(),
        Err(_) => route
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Route-scoped retrieval over a [`RetrievalStore`].
pub struct CodeRetriever {
    store: Arc<dyn RetrievalStore>,
}

impl CodeRetriever {
    pub fn new(store: Arc<dyn RetrievalStore>) -> Self {
        Self { store }
    }

    /// Top `top_k` fragments for `route`.
    ///
    /// One filtered call on `route_hint`; one unconstrained call only if the
    /// filtered call came back empty.
    pub async fn query(
        &self,
        route: &str,
        profile: &TrimmedProfile,
        collection: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedFragment>> {
        if collection.trim().is_empty() {
            return Err(SearchError::EmptyCollection);
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_text = build_query_text(route, profile);
        let route_path = normalize_route_path(route);
        let filter = MetadataFilter::eq("route_hint", route_path.as_str());

        let mut matches = self
            .store
            .query(collection, &query_text, top_k, Some(&filter))
            .await?;

        if matches.is_empty() {
            log::debug!("No fragments hinted for {route_path}, searching whole collection");
            matches = self
                .store
                .query(collection, &query_text, top_k, None)
                .await?;
        }

        let mut fragments: Vec<RetrievedFragment> =
            matches.into_iter().map(RetrievedFragment::from).collect();
        fragments.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        fragments.truncate(top_k);

        log::debug!("Retrieved {} fragments for {route}", fragments.len());
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_urls_and_paths() {
        assert_eq!(normalize_route_path("https://site.dev"), "/");
        assert_eq!(normalize_route_path("https://site.dev/"), "/");
        assert_eq!(normalize_route_path("https://site.dev/blog/"), "/blog");
        assert_eq!(normalize_route_path("https://site.dev/blog/post?x=1#top"), "/blog/post");
        assert_eq!(normalize_route_path("/about/"), "/about");
        assert_eq!(normalize_route_path("about"), "/about");
        assert_eq!(normalize_route_path(""), "/");
    }
}
