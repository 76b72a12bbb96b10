use serde::{Deserialize, Serialize};
use std::fmt;

/// The four page-performance metrics every insight reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricName {
    #[serde(rename = "FCP")]
    Fcp,
    #[serde(rename = "LCP")]
    Lcp,
    #[serde(rename = "CLS")]
    Cls,
    #[serde(rename = "TBT")]
    Tbt,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [Self::Fcp, Self::Lcp, Self::Cls, Self::Tbt];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fcp => "FCP",
            Self::Lcp => "LCP",
            Self::Cls => "CLS",
            Self::Tbt => "TBT",
        }
    }

    /// Human-readable name used in retrieval queries.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::Fcp => "First Contentful Paint",
            Self::Lcp => "Largest Contentful Paint",
            Self::Cls => "Cumulative Layout Shift",
            Self::Tbt => "Total Blocking Time",
        }
    }

    /// Lighthouse audit id carrying this metric's display value.
    #[must_use]
    pub const fn audit_id(self) -> &'static str {
        match self {
            Self::Fcp => "first-contentful-paint",
            Self::Lcp => "largest-contentful-paint",
            Self::Cls => "cumulative-layout-shift",
            Self::Tbt => "total-blocking-time",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
