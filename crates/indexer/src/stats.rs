use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about an indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of files selected by the scanner
    pub files: usize,

    /// Number of fragments uploaded
    pub fragments: usize,

    /// Number of upsert batches sent
    pub batches: usize,

    /// Total lines across selected files
    pub total_lines: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Files per extension
    pub extensions: BTreeMap<String, usize>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, extension: &str, lines: usize) {
        self.files += 1;
        self.total_lines += lines;
        *self.extensions.entry(extension.to_string()).or_insert(0) += 1;
    }

    pub fn add_fragments(&mut self, count: usize) {
        self.fragments += count;
    }
}
