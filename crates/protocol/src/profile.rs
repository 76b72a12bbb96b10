use crate::metric::MetricName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display value of a single metric as reported by the measurement service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDisplay {
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetrics {
    #[serde(rename = "FCP")]
    pub fcp: MetricDisplay,
    #[serde(rename = "LCP")]
    pub lcp: MetricDisplay,
    #[serde(rename = "CLS")]
    pub cls: MetricDisplay,
    #[serde(rename = "TBT")]
    pub tbt: MetricDisplay,
}

impl ProfileMetrics {
    pub fn get(&self, metric: MetricName) -> &MetricDisplay {
        match metric {
            MetricName::Fcp => &self.fcp,
            MetricName::Lcp => &self.lcp,
            MetricName::Cls => &self.cls,
            MetricName::Tbt => &self.tbt,
        }
    }

    pub fn get_mut(&mut self, metric: MetricName) -> &mut MetricDisplay {
        match metric {
            MetricName::Fcp => &mut self.fcp,
            MetricName::Lcp => &mut self.lcp,
            MetricName::Cls => &mut self.cls,
            MetricName::Tbt => &mut self.tbt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Option<String>,
    pub weight: Option<f64>,
}

/// The subset of a raw performance document the rest of the pipeline looks at.
///
/// Every field is optional or empty-able; trimming never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimmedProfile {
    pub url: Option<String>,
    #[serde(rename = "overallScore")]
    pub overall_score: Option<f64>,
    pub metrics: ProfileMetrics,
    pub diagnostics: Value,
    pub opportunities: Vec<Opportunity>,
}

impl Default for TrimmedProfile {
    fn default() -> Self {
        Self {
            url: None,
            overall_score: None,
            metrics: ProfileMetrics::default(),
            diagnostics: Value::Object(serde_json::Map::new()),
            opportunities: Vec::new(),
        }
    }
}
