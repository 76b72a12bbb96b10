use crate::metric::MetricName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder metric value used whenever real analysis was impossible.
pub const SENTINEL_VALUE: &str = "N/A";
pub const NO_PROFILE_STEP: &str = "No PSI data";
pub const INTERNAL_ERROR_STEP: &str = "Internal error";
pub const INVALID_RESPONSE_STEP: &str = "Model response was not valid JSON";
pub const MISSING_METRIC_STEP: &str = "Metric missing from model response";

/// Steps that mark a whole insight as a placeholder.
pub const FALLBACK_STEPS: [&str; 3] = [NO_PROFILE_STEP, INTERNAL_ERROR_STEP, INVALID_RESPONSE_STEP];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInsight {
    pub value: String,
    #[serde(rename = "recommendedSteps", default)]
    pub recommended_steps: Vec<String>,
}

impl MetricInsight {
    pub fn sentinel(step: impl Into<String>) -> Self {
        Self {
            value: SENTINEL_VALUE.to_string(),
            recommended_steps: vec![step.into()],
        }
    }
}

/// One measurement snapshot: exactly the four metrics, by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    #[serde(rename = "FCP")]
    pub fcp: MetricInsight,
    #[serde(rename = "LCP")]
    pub lcp: MetricInsight,
    #[serde(rename = "CLS")]
    pub cls: MetricInsight,
    #[serde(rename = "TBT")]
    pub tbt: MetricInsight,
}

impl PerformanceEntry {
    pub fn sentinel(step: &str) -> Self {
        Self {
            fcp: MetricInsight::sentinel(step),
            lcp: MetricInsight::sentinel(step),
            cls: MetricInsight::sentinel(step),
            tbt: MetricInsight::sentinel(step),
        }
    }

    pub fn get(&self, metric: MetricName) -> &MetricInsight {
        match metric {
            MetricName::Fcp => &self.fcp,
            MetricName::Lcp => &self.lcp,
            MetricName::Cls => &self.cls,
            MetricName::Tbt => &self.tbt,
        }
    }

    pub fn get_mut(&mut self, metric: MetricName) -> &mut MetricInsight {
        match metric {
            MetricName::Fcp => &mut self.fcp,
            MetricName::Lcp => &mut self.lcp,
            MetricName::Cls => &mut self.cls,
            MetricName::Tbt => &mut self.tbt,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricName, &MetricInsight)> {
        MetricName::ALL
            .into_iter()
            .map(move |metric| (metric, self.get(metric)))
    }
}

/// A concrete source edit suggested for one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChange {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    pub old_code: String,
    pub new_code: String,
    pub explanation: String,
}

/// The validated analysis record for one route.
///
/// `performanceData` is serialized as a one-element array; deserializing any
/// other length is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub route: String,
    #[serde(rename = "performanceData", with = "single_entry")]
    pub performance_data: PerformanceEntry,
    /// Keyed by metric name (`FCP`, `LCP`, `CLS`, `TBT`).
    #[serde(rename = "codeChanges", default)]
    pub code_changes: BTreeMap<String, Vec<CodeChange>>,
    /// Raw model text kept when the response could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Insight {
    pub fn new(route: impl Into<String>, performance_data: PerformanceEntry) -> Self {
        Self {
            route: route.into(),
            performance_data,
            code_changes: BTreeMap::new(),
            error: None,
        }
    }

    /// Deterministic placeholder with every metric set to [`SENTINEL_VALUE`].
    pub fn fallback(route: impl Into<String>, step: &str) -> Self {
        Self::new(route, PerformanceEntry::sentinel(step))
    }

    /// True for insights built by [`Insight::fallback`] with one of
    /// [`FALLBACK_STEPS`]. A model answer that reports "N/A" values is not
    /// a fallback.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        let Some(step) = self.performance_data.fcp.recommended_steps.first() else {
            return false;
        };
        FALLBACK_STEPS.contains(&step.as_str())
            && self.performance_data == PerformanceEntry::sentinel(step)
    }
}

mod single_entry {
    use super::PerformanceEntry;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        entry: &PerformanceEntry,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        std::slice::from_ref(entry).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<PerformanceEntry, D::Error> {
        let mut entries = Vec::<PerformanceEntry>::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(D::Error::invalid_length(
                entries.len(),
                &"exactly one performance entry",
            ));
        }
        Ok(entries.remove(0))
    }
}
