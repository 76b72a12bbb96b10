//! Data shapes exchanged between the sitelens pipeline stages.
//!
//! Everything here is plain serde data: no I/O, no clients. The wire names
//! (`performanceData`, `recommendedSteps`, `codeChanges`, ...) are what the
//! persistence boundary stores and what the model is asked to emit.

pub mod duration_secs;
mod insight;
mod metric;
mod profile;
mod state;

pub use insight::{
    CodeChange, Insight, MetricInsight, PerformanceEntry, FALLBACK_STEPS, INTERNAL_ERROR_STEP,
    INVALID_RESPONSE_STEP, MISSING_METRIC_STEP, NO_PROFILE_STEP, SENTINEL_VALUE,
};
pub use metric::MetricName;
pub use profile::{MetricDisplay, Opportunity, ProfileMetrics, TrimmedProfile};
pub use state::{ProjectAnalysisState, RunStatus};
