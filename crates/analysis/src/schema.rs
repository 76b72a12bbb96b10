use serde_json::{json, Map, Value};
use sitelens_protocol::MetricName;

/// Gemini `responseSchema` for one insight: a route plus exactly one
/// performance entry holding all four metrics.
pub fn insight_response_schema() -> Value {
    let metric_schema = json!({
        "type": "OBJECT",
        "properties": {
            "value": {"type": "STRING"},
            "recommendedSteps": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["value", "recommendedSteps"]
    });

    let mut metrics = Map::new();
    for metric in MetricName::ALL {
        metrics.insert(metric.as_str().to_string(), metric_schema.clone());
    }
    let required: Vec<&str> = MetricName::ALL.iter().map(|m| m.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "route": {"type": "STRING"},
            "performanceData": {
                "type": "ARRAY",
                "minItems": 1,
                "maxItems": 1,
                "items": {
                    "type": "OBJECT",
                    "properties": metrics,
                    "required": required
                }
            }
        },
        "required": ["route", "performanceData"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn requires_exactly_one_entry_with_all_metrics() {
        let schema = insight_response_schema();
        let data = &schema["properties"]["performanceData"];
        assert_eq!(data["minItems"], 1);
        assert_eq!(data["maxItems"], 1);
        assert_eq!(data["items"]["required"], json!(["FCP", "LCP", "CLS", "TBT"]));
        assert_eq!(
            data["items"]["properties"]["CLS"]["required"],
            json!(["value", "recommendedSteps"])
        );
    }
}
