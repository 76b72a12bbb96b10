use sitelens_protocol::{MetricName, TrimmedProfile};
use std::fmt::Write;

/// Natural-language retrieval query for one route.
///
/// Pure function of its inputs.
pub fn build_query_text(route: &str, profile: &TrimmedProfile) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Find the code snippets most relevant to performance on route \"{route}\"."
    );
    text.push_str("Performance metrics:\n");
    for metric in MetricName::ALL {
        let value = profile
            .metrics
            .get(metric)
            .display_value
            .as_deref()
            .unwrap_or("n/a");
        let _ = writeln!(text, "  • {} ({metric}): {value}", metric.long_name());
    }

    text.push_str("Diagnostics:\n");
    let diagnostics =
        serde_json::to_string_pretty(&profile.diagnostics).unwrap_or_else(|_| "{}".to_string());
    let _ = writeln!(text, "  {diagnostics}");

    text.push_str("Opportunities:\n");
    for opportunity in &profile.opportunities {
        let id = opportunity.id.as_deref().unwrap_or("unknown");
        let weight = opportunity
            .weight
            .map_or_else(|| "n/a".to_string(), |w| w.to_string());
        let _ = writeln!(text, "- {id} (weight: {weight})");
    }

    text.push_str(
        "\nReturn the chunks of code that are likely responsible for these metrics\n\
         or could be tuned to improve them.",
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sitelens_protocol::{MetricDisplay, Opportunity};

    #[test]
    fn renders_metrics_and_opportunities() {
        let mut profile = TrimmedProfile::default();
        profile.metrics.lcp = MetricDisplay {
            display_value: Some("3.1 s".to_string()),
        };
        profile.opportunities = vec![Opportunity {
            id: Some("render-blocking-resources".to_string()),
            weight: Some(0.0),
        }];

        let text = build_query_text("/blog", &profile);

        assert!(text.starts_with(
            "Find the code snippets most relevant to performance on route \"/blog\"."
        ));
        assert!(text.contains("  • First Contentful Paint (FCP): n/a\n"));
        assert!(text.contains("  • Largest Contentful Paint (LCP): 3.1 s\n"));
        assert!(text.contains("Diagnostics:\n  {}\n"));
        assert!(text.contains("- render-blocking-resources (weight: 0)\n"));
        assert!(text.ends_with("could be tuned to improve them."));
    }

    #[test]
    fn is_deterministic() {
        let profile = TrimmedProfile::default();
        assert_eq!(
            build_query_text("/", &profile),
            build_query_text("/", &profile)
        );
    }
}
