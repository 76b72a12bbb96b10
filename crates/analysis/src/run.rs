use crate::coordinator::Pipeline;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitelens_protocol::ProjectAnalysisState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What a run analyzes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub site_url: String,
    pub project_name: String,
    #[serde(default)]
    pub repo_url: Option<String>,
}

/// Receives a run's terminal state. Called once per run with the complete
/// insight list, never with partial results.
#[async_trait]
pub trait RunStateSink: Send + Sync {
    async fn commit(&self, run_id: &str, state: &ProjectAnalysisState) -> Result<()>;
}

/// Keeps committed states in memory; for the CLI and tests.
#[derive(Default)]
pub struct InMemoryStateSink {
    states: RwLock<HashMap<String, ProjectAnalysisState>>,
}

impl InMemoryStateSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, run_id: &str) -> Option<ProjectAnalysisState> {
        self.states.read().await.get(run_id).cloned()
    }
}

#[async_trait]
impl RunStateSink for InMemoryStateSink {
    async fn commit(&self, run_id: &str, state: &ProjectAnalysisState) -> Result<()> {
        self.states
            .write()
            .await
            .insert(run_id.to_string(), state.clone());
        Ok(())
    }
}

/// Entry point for a job dispatcher: one call per run request.
pub struct RunProcessor {
    pipeline: Arc<Pipeline>,
    sink: Arc<dyn RunStateSink>,
}

impl RunProcessor {
    pub fn new(pipeline: Arc<Pipeline>, sink: Arc<dyn RunStateSink>) -> Self {
        Self { pipeline, sink }
    }

    /// Run the pipeline and commit `complete` or `error`.
    ///
    /// The returned state is what was committed. An `Err` means the sink
    /// rejected the commit, which a dispatcher may redeliver.
    pub async fn process_run(
        &self,
        run_id: &str,
        context: &ProjectContext,
    ) -> Result<ProjectAnalysisState> {
        log::info!("Run {run_id}: analyzing {}", context.site_url);
        let pending = ProjectAnalysisState::pending();

        let state = match self
            .pipeline
            .run(
                &context.site_url,
                &context.project_name,
                context.repo_url.as_deref(),
            )
            .await
        {
            Ok(insights) => pending.complete(insights),
            Err(e) => {
                log::error!("Run {run_id} failed: {e}");
                pending.fail()
            }
        };

        self.sink.commit(run_id, &state).await?;
        log::info!("Run {run_id}: {:?} with {} insights", state.status, state.insights.len());
        Ok(state)
    }
}
