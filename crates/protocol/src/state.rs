use crate::insight::Insight;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Complete,
    Error,
}

/// Status plus the full insight list of one analysis run.
///
/// Only `pending -> complete` and `pending -> error` are valid transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnalysisState {
    pub status: RunStatus,
    pub insights: Vec<Insight>,
}

impl ProjectAnalysisState {
    pub fn pending() -> Self {
        Self {
            status: RunStatus::Pending,
            insights: Vec::new(),
        }
    }

    /// Commits the complete insight list in one step.
    pub fn complete(self, insights: Vec<Insight>) -> Self {
        debug_assert_eq!(self.status, RunStatus::Pending);
        Self {
            status: RunStatus::Complete,
            insights,
        }
    }

    /// Marks the run failed; no insights are kept.
    pub fn fail(self) -> Self {
        debug_assert_eq!(self.status, RunStatus::Pending);
        Self {
            status: RunStatus::Error,
            insights: Vec::new(),
        }
    }
}
