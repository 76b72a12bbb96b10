use crate::clients::ModelClient;
use crate::code_changes::collect_code_changes;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::profile::trim_profile;
use crate::prompt::build_prompt;
use crate::response::ParsedResponse;
use crate::schema::insight_response_schema;
use serde_json::Value;
use sitelens_protocol::{Insight, TrimmedProfile, INTERNAL_ERROR_STEP, NO_PROFILE_STEP};
use sitelens_search::{CodeRetriever, RetrievedFragment};
use std::sync::Arc;

/// Turns one route's performance document into an [`Insight`].
pub struct RouteAnalyzer {
    model: Arc<dyn ModelClient>,
    retriever: Option<CodeRetriever>,
    response_schema: Value,
    top_k: usize,
    snippet_lines: usize,
}

impl RouteAnalyzer {
    pub fn new(
        model: Arc<dyn ModelClient>,
        retriever: Option<CodeRetriever>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            model,
            retriever,
            response_schema: insight_response_schema(),
            top_k: config.top_k,
            snippet_lines: config.snippet_lines,
        }
    }

    /// Analyze `route`. Never fails: a missing profile or any error along
    /// the way yields a sentinel insight for this route only.
    pub async fn analyze(
        &self,
        route: &str,
        raw_profile: Option<&Value>,
        collection: Option<&str>,
    ) -> Insight {
        let Some(raw_profile) = raw_profile else {
            log::warn!("{route}: no performance data, emitting fallback");
            return Insight::fallback(route, NO_PROFILE_STEP);
        };

        match self.try_analyze(route, raw_profile, collection).await {
            Ok(insight) => insight,
            Err(e) => {
                log::warn!("{route}: analysis failed ({e}), emitting fallback");
                Insight::fallback(route, INTERNAL_ERROR_STEP)
            }
        }
    }

    async fn try_analyze(
        &self,
        route: &str,
        raw_profile: &Value,
        collection: Option<&str>,
    ) -> Result<Insight> {
        let trimmed = trim_profile(raw_profile);
        let fragments = self.code_context(route, &trimmed, collection).await;

        let prompt = build_prompt(route, &trimmed, &fragments, self.snippet_lines);
        log::debug!("{route}: prompt\n{prompt}");

        let raw = self.model.generate(&prompt, &self.response_schema).await?;
        log::debug!("{route}: raw model response {raw:?}");

        let parsed = ParsedResponse::parse(&raw);
        match &parsed {
            ParsedResponse::Insight(p) if !p.missing.is_empty() => {
                log::warn!("{route}: model omitted {:?}", p.missing);
            }
            ParsedResponse::RawTextFallback(_) => {
                log::warn!("{route}: model response was not a usable insight");
            }
            ParsedResponse::Insight(_) => {}
        }

        let mut insight = parsed.into_insight(route);
        insight.code_changes = collect_code_changes(&insight.performance_data);
        Ok(insight)
    }

    /// Retrieval errors degrade to an empty context.
    async fn code_context(
        &self,
        route: &str,
        trimmed: &TrimmedProfile,
        collection: Option<&str>,
    ) -> Vec<RetrievedFragment> {
        let (Some(retriever), Some(collection)) = (&self.retriever, collection) else {
            return Vec::new();
        };
        match self.retrieve(retriever, route, trimmed, collection).await {
            Ok(fragments) => {
                log::info!("{route}: retrieved {} code fragments", fragments.len());
                fragments
            }
            Err(e) => {
                log::warn!("{route}: {e}, continuing without code");
                Vec::new()
            }
        }
    }

    async fn retrieve(
        &self,
        retriever: &CodeRetriever,
        route: &str,
        trimmed: &TrimmedProfile,
        collection: &str,
    ) -> Result<Vec<RetrievedFragment>> {
        Ok(retriever.query(route, trimmed, collection, self.top_k).await?)
    }
}
