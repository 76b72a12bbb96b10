use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TAG_HEAVY_IMPORTS: &str = "heavy-imports";
pub const TAG_CODE_SPLITTING: &str = "code-splitting";

/// A source file selected for indexing, with the file-level statistics the
/// fragment tags are derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Absolute path inside the checkout
    pub file_path: String,

    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,

    /// Lowercased extension without the leading dot
    pub extension: String,

    /// Site route this file renders, for files under a pages directory
    pub route_hint: Option<String>,

    pub size_bytes: u64,
    pub line_count: usize,
    pub import_count: usize,
    pub dynamic_import_count: usize,
}

impl SourceFile {
    /// Build file metadata from its content
    pub fn from_content(
        file_path: impl Into<String>,
        relative_path: impl Into<String>,
        content: &str,
    ) -> Self {
        let relative_path = relative_path.into();
        let extension = Path::new(&relative_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        Self {
            file_path: file_path.into(),
            extension,
            route_hint: None,
            size_bytes: content.len() as u64,
            line_count: content.lines().count(),
            import_count: content.matches("import ").count(),
            dynamic_import_count: content.matches("import(").count(),
            relative_path,
        }
    }

    /// Builder: set route hint
    #[must_use]
    pub fn with_route_hint(mut self, hint: impl Into<String>) -> Self {
        self.route_hint = Some(hint.into());
        self
    }
}

/// A fixed-size line window of a source file; the unit of code retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFragment {
    /// `<relative_path>-<start_line>`, stable across runs
    pub fragment_id: String,

    /// The window's text, lines joined with `\n`
    pub content: String,

    pub file_path: String,
    pub relative_path: String,
    pub extension: String,
    pub route_hint: Option<String>,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// Size of the whole source file
    pub size_bytes: u64,

    /// Lines in this window
    pub line_count: usize,

    pub import_count: usize,
    pub dynamic_import_count: usize,

    /// Unique tags, in insertion order
    pub tags: Vec<String>,
}

impl CodeFragment {
    /// Stable id for the window starting at `start_line`.
    #[must_use]
    pub fn make_id(relative_path: &str, start_line: usize) -> String {
        format!("{relative_path}-{start_line}")
    }

    /// Check if fragment contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}
