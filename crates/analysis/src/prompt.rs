use sitelens_protocol::TrimmedProfile;
use sitelens_search::RetrievedFragment;

const RULES: &str = r#"Your task:
For each metric (FCP, LCP, CLS, TBT) in the JSON skeleton below,
populate its "recommendedSteps" array of strings according to these rules:

1. **Status** entry (always first):
   - Must start with "Status: Good;", "Status: Moderate;", or "Status: Needs Improvement;"

2. **Code Change** entries (at least one per metric, **always**):
   - Must start with "Code Change: from `<old code>` to `<new code>` in <file> lines X–Y; <explanation>"
   - Reference one of the provided code snippets above.

3. **General Tips** entries (optional extras):
   - Must start with "Tips: <concise recommendation>"

4. Do **NOT** modify the JSON structure or add extra fields."#;

/// The model prompt for one route. Pure function of its inputs.
pub fn build_prompt(
    route: &str,
    profile: &TrimmedProfile,
    fragments: &[RetrievedFragment],
    snippet_lines: usize,
) -> String {
    let profile_json =
        serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_string());

    let snippets = if fragments.is_empty() {
        "(no code snippets found)".to_string()
    } else {
        fragments
            .iter()
            .enumerate()
            .map(|(idx, fragment)| render_snippet(idx + 1, fragment, snippet_lines))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let sections = [
        "You are a senior performance-focused developer.".to_string(),
        format!("Below is the PageSpeed Insights data for route \"{route}\""),
        format!("and the top {} relevant code snippets.", fragments.len()),
        String::new(),
        "=== PSI DATA ===".to_string(),
        profile_json,
        String::new(),
        "=== CODE SNIPPETS ===".to_string(),
        snippets,
        String::new(),
        RULES.to_string(),
        String::new(),
        "Here is the JSON to update:".to_string(),
        json_skeleton(route),
    ];
    sections.join("\n").trim().to_string()
}

fn render_snippet(index: usize, fragment: &RetrievedFragment, snippet_lines: usize) -> String {
    let start = fragment.start_line().unwrap_or(1);
    let end = fragment.end_line().unwrap_or(start);
    let path = fragment.relative_path().unwrap_or("<unknown>");

    let lines: Vec<&str> = fragment.content.lines().collect();
    let body = lines
        .iter()
        .take(snippet_lines)
        .zip(start..)
        .map(|(line, number)| format!("{number}: {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    let truncated = if lines.len() > snippet_lines {
        "\n…(truncated)"
    } else {
        ""
    };

    format!("--- Chunk {index} ---\nFile: {path} [lines {start}–{end}]\n{body}{truncated}")
}

fn json_skeleton(route: &str) -> String {
    let route = serde_json::to_string(route).unwrap_or_else(|_| format!("\"{route}\""));
    format!(
        "{{\n  \"route\": {route},\n  \"performanceData\": [\n    {{\n\
         \x20     \"FCP\": {{\"value\": \"<string>\", \"recommendedSteps\": []}},\n\
         \x20     \"LCP\": {{\"value\": \"<string>\", \"recommendedSteps\": []}},\n\
         \x20     \"CLS\": {{\"value\": \"<string>\", \"recommendedSteps\": []}},\n\
         \x20     \"TBT\": {{\"value\": \"<string>\", \"recommendedSteps\": []}}\n\
         \x20   }}\n  ]\n}}"
    )
}
