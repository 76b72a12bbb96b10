use serde_json::{Map, Value};
use sitelens_protocol::{MetricDisplay, MetricName, Opportunity, ProfileMetrics, TrimmedProfile};

const OPPORTUNITY_GROUP: &str = "load-opportunities";

/// Reduce a PageSpeed Insights v5 document to the fields the prompt uses.
///
/// Total: missing or mistyped fields come out as `None` / empty.
pub fn trim_profile(raw: &Value) -> TrimmedProfile {
    let lighthouse = &raw["lighthouseResult"];
    let audits = &lighthouse["audits"];
    let performance = &lighthouse["categories"]["performance"];

    let mut metrics = ProfileMetrics::default();
    for metric in MetricName::ALL {
        *metrics.get_mut(metric) = MetricDisplay {
            display_value: audits[metric.audit_id()]["displayValue"]
                .as_str()
                .map(str::to_string),
        };
    }

    let diagnostics = match &audits["diagnostics"]["details"]["items"][0] {
        Value::Object(map) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    };

    let opportunities = performance["auditRefs"]
        .as_array()
        .map(|refs| {
            refs.iter()
                .filter(|r| r["group"].as_str() == Some(OPPORTUNITY_GROUP))
                .map(|r| Opportunity {
                    id: r["id"].as_str().map(str::to_string),
                    weight: r["weight"].as_f64(),
                })
                .collect()
        })
        .unwrap_or_default();

    TrimmedProfile {
        url: raw["id"].as_str().map(str::to_string),
        overall_score: performance["score"].as_f64(),
        metrics,
        diagnostics,
        opportunities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": "https://site.dev/",
            "lighthouseResult": {
                "categories": {"performance": {
                    "score": 0.72,
                    "auditRefs": [
                        {"id": "render-blocking-resources", "weight": 0, "group": "load-opportunities"},
                        {"id": "first-contentful-paint", "weight": 10, "group": "metrics"},
                        {"id": "unused-javascript", "weight": 0.5, "group": "load-opportunities"}
                    ]
                }},
                "audits": {
                    "first-contentful-paint": {"displayValue": "1.8\u{a0}s"},
                    "largest-contentful-paint": {"displayValue": "3.4 s"},
                    "cumulative-layout-shift": {"displayValue": "0.02"},
                    "diagnostics": {"details": {"items": [{"numRequests": 42}]}}
                }
            }
        })
    }

    #[test]
    fn extracts_metrics_diagnostics_and_opportunities() {
        let trimmed = trim_profile(&sample());

        assert_eq!(trimmed.url.as_deref(), Some("https://site.dev/"));
        assert_eq!(trimmed.overall_score, Some(0.72));
        assert_eq!(trimmed.metrics.lcp.display_value.as_deref(), Some("3.4 s"));
        assert_eq!(trimmed.metrics.tbt.display_value, None);
        assert_eq!(trimmed.diagnostics, json!({"numRequests": 42}));
        assert_eq!(
            trimmed.opportunities,
            vec![
                Opportunity {
                    id: Some("render-blocking-resources".to_string()),
                    weight: Some(0.0),
                },
                Opportunity {
                    id: Some("unused-javascript".to_string()),
                    weight: Some(0.5),
                },
            ]
        );
    }

    #[test]
    fn empty_document_trims_to_defaults() {
        assert_eq!(trim_profile(&json!({})), TrimmedProfile::default());
        assert_eq!(trim_profile(&json!("not an object")), TrimmedProfile::default());
    }

    #[test]
    fn trimming_is_deterministic() {
        let raw = sample();
        let a = serde_json::to_string(&trim_profile(&raw)).unwrap();
        let b = serde_json::to_string(&trim_profile(&raw)).unwrap();
        assert_eq!(a, b);
    }
}
