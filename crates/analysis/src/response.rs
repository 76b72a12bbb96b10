use serde_json::Value;
use sitelens_protocol::{
    Insight, MetricInsight, MetricName, PerformanceEntry, INVALID_RESPONSE_STEP,
    MISSING_METRIC_STEP,
};

/// Outcome of reading untrusted model output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Insight(ParsedInsight),
    /// No usable JSON object; carries the raw text.
    RawTextFallback(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInsight {
    pub performance_data: PerformanceEntry,
    /// Metrics the model left out, filled with a sentinel.
    pub missing: Vec<MetricName>,
}

impl ParsedResponse {
    /// Extract, parse and validate `raw`.
    pub fn parse(raw: &str) -> Self {
        let fallback = || Self::RawTextFallback(raw.to_string());

        let Some(span) = first_json_object(raw) else {
            return fallback();
        };
        let Ok(value) = serde_json::from_str::<Value>(span) else {
            return fallback();
        };
        let entry = match &value["performanceData"] {
            Value::Array(entries) => entries.first(),
            Value::Object(_) => Some(&value["performanceData"]),
            _ => None,
        };
        let Some(entry) = entry.filter(|entry| entry.is_object()) else {
            return fallback();
        };

        let mut missing = Vec::new();
        let mut performance_data = PerformanceEntry::sentinel(MISSING_METRIC_STEP);
        for metric in MetricName::ALL {
            match read_metric(&entry[metric.as_str()]) {
                Some(insight) => *performance_data.get_mut(metric) = insight,
                None => missing.push(metric),
            }
        }

        if missing.len() == MetricName::ALL.len() {
            return fallback();
        }
        Self::Insight(ParsedInsight {
            performance_data,
            missing,
        })
    }

    /// Build the route's insight. The route always comes from the caller,
    /// never from the model output.
    pub fn into_insight(self, route: &str) -> Insight {
        match self {
            Self::Insight(parsed) => {
                let mut entry = parsed.performance_data;
                for metric in MetricName::ALL {
                    let insight = entry.get_mut(metric);
                    insight.value = collapse_whitespace(&insight.value);
                }
                Insight::new(route, entry)
            }
            Self::RawTextFallback(raw) => {
                let mut insight = Insight::fallback(route, INVALID_RESPONSE_STEP);
                insight.error = Some(raw);
                insight
            }
        }
    }
}

fn read_metric(value: &Value) -> Option<MetricInsight> {
    let object = value.as_object()?;
    let metric_value = match object.get("value")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let recommended_steps = object
        .get("recommendedSteps")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(MetricInsight {
        value: metric_value,
        recommended_steps,
    })
}

/// Whitespace runs become one space; ends are trimmed.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first balanced `{...}` span of `text`, skipping braces inside JSON
/// string literals.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
