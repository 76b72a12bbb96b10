use regex::Regex;
use sitelens_protocol::{CodeChange, PerformanceEntry};
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn code_change_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?s)^\s*Code Change:\s*from\s+`(?P<old>[^`]*)`\s+to\s+`(?P<new>[^`]*)`\s+in\s+(?P<file>\S+?)\s+lines?\s+(?P<start>\d+)(?:\s*(?:-|–|—|to)\s*(?P<end>\d+))?\s*[;:,.]?\s*(?P<explanation>.*?)\s*$",
            )
            .ok()
        })
        .as_ref()
}

/// Parse one `Code Change: from `old` to `new` in <file> lines X–Y; why` step.
pub fn parse_code_change(step: &str) -> Option<CodeChange> {
    let captures = code_change_pattern()?.captures(step)?;
    let start_line: usize = captures["start"].parse().ok()?;
    let end_line = match captures.name("end") {
        Some(end) => end.as_str().parse().ok()?,
        None => start_line,
    };

    Some(CodeChange {
        file: captures["file"].trim_end_matches([',', ';', ':']).to_string(),
        start_line,
        end_line: end_line.max(start_line),
        old_code: captures["old"].to_string(),
        new_code: captures["new"].to_string(),
        explanation: captures["explanation"].to_string(),
    })
}

/// Structured code changes per metric name, for metrics that have any.
pub fn collect_code_changes(entry: &PerformanceEntry) -> BTreeMap<String, Vec<CodeChange>> {
    entry
        .iter()
        .filter_map(|(metric, insight)| {
            let changes: Vec<CodeChange> = insight
                .recommended_steps
                .iter()
                .filter_map(|step| parse_code_change(step))
                .collect();
            (!changes.is_empty()).then(|| (metric.as_str().to_string(), changes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sitelens_protocol::MetricInsight;

    #[test]
    fn parses_range_step() {
        let change = parse_code_change(
            "Code Change: from `<img src={hero} />` to `<Image src={hero} priority />` in pages/index.tsx lines 12–14; preload the LCP image",
        )
        .unwrap();
        assert_eq!(
            change,
            CodeChange {
                file: "pages/index.tsx".to_string(),
                start_line: 12,
                end_line: 14,
                old_code: "<img src={hero} />".to_string(),
                new_code: "<Image src={hero} priority />".to_string(),
                explanation: "preload the LCP image".to_string(),
            }
        );
    }

    #[test]
    fn single_line_and_hyphen_ranges() {
        let single =
            parse_code_change("Code Change: from `a` to `b` in src/x.css line 7; trim").unwrap();
        assert_eq!((single.start_line, single.end_line), (7, 7));

        let hyphen =
            parse_code_change("Code Change: from `a` to `b` in src/x.css lines 3-9: why").unwrap();
        assert_eq!((hyphen.start_line, hyphen.end_line), (3, 9));
        assert_eq!(hyphen.explanation, "why");
    }

    #[test]
    fn other_steps_are_not_code_changes() {
        assert!(parse_code_change("Status: Good; 1.2 s").is_none());
        assert!(parse_code_change("Tips: lazy-load images").is_none());
        assert!(parse_code_change("Code Change: inline critical CSS").is_none());
    }

    #[test]
    fn collects_per_metric() {
        let mut entry = PerformanceEntry::sentinel("Status: Good;");
        entry.lcp = MetricInsight {
            value: "3 s".to_string(),
            recommended_steps: vec![
                "Status: Moderate;".to_string(),
                "Code Change: from `a` to `b` in pages/a.tsx lines 1–2; faster".to_string(),
            ],
        };

        let changes = collect_code_changes(&entry);
        assert_eq!(changes.keys().collect::<Vec<_>>(), vec!["LCP"]);
        assert_eq!(changes["LCP"][0].file, "pages/a.tsx");
    }
}
