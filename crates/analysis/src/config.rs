use serde::{Deserialize, Serialize};
use sitelens_protocol::duration_secs;
use std::time::Duration;

/// Per-run analysis limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum routes analyzed per run
    pub route_cap: usize,

    /// Simultaneous metrics fetches
    pub metrics_concurrency: usize,

    /// Simultaneous per-route analyses
    pub analysis_concurrency: usize,

    /// Budget for one metrics fetch (seconds in config files)
    #[serde(with = "duration_secs")]
    pub metrics_timeout: Duration,

    /// Budget for one route's retrieval + model round trip
    #[serde(with = "duration_secs")]
    pub analysis_timeout: Duration,

    /// Fragments retrieved per route
    pub top_k: usize,

    /// Lines of each fragment shown in the prompt
    pub snippet_lines: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            route_cap: 5,
            metrics_concurrency: 2,
            analysis_concurrency: 2,
            metrics_timeout: Duration::from_secs(60),
            analysis_timeout: Duration::from_secs(120),
            top_k: 5,
            snippet_lines: 20,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.route_cap == 0 {
            return Err("route_cap must be > 0".to_string());
        }
        if self.metrics_concurrency == 0 || self.analysis_concurrency == 0 {
            return Err("concurrency limits must be > 0".to_string());
        }
        if self.metrics_timeout.is_zero() || self.analysis_timeout.is_zero() {
            return Err("timeouts must be > 0".to_string());
        }
        if self.snippet_lines == 0 {
            return Err("snippet_lines must be > 0".to_string());
        }
        Ok(())
    }
}
