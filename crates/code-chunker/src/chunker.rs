use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::types::{CodeFragment, SourceFile, TAG_CODE_SPLITTING, TAG_HEAVY_IMPORTS};

/// Main chunker interface for splitting source files into fragments
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker with configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `content` into consecutive windows of `window_lines` lines.
    ///
    /// An empty file yields no fragments.
    pub fn chunk(&self, source: &SourceFile, content: &str) -> Vec<CodeFragment> {
        let lines: Vec<&str> = content.lines().collect();
        let window = self.config.window_lines;
        let tags = self.tags_for(source);
        let mut fragments = Vec::with_capacity(lines.len().div_ceil(window));

        for (index, window_lines) in lines.chunks(window).enumerate() {
            let start_line = index * window + 1;
            let end_line = start_line + window_lines.len() - 1;

            fragments.push(CodeFragment {
                fragment_id: CodeFragment::make_id(&source.relative_path, start_line),
                content: window_lines.join("\n"),
                file_path: source.file_path.clone(),
                relative_path: source.relative_path.clone(),
                extension: source.extension.clone(),
                route_hint: source.route_hint.clone(),
                start_line,
                end_line,
                size_bytes: source.size_bytes,
                line_count: window_lines.len(),
                import_count: source.import_count,
                dynamic_import_count: source.dynamic_import_count,
                tags: tags.clone(),
            });
        }

        log::debug!(
            "Chunked {} into {} fragments",
            source.relative_path,
            fragments.len()
        );
        fragments
    }

    fn tags_for(&self, source: &SourceFile) -> Vec<String> {
        let mut tags = Vec::with_capacity(4);
        if let Some(hint) = &source.route_hint {
            tags.push(format!("route:{hint}"));
        }
        tags.push(format!("ext:{}", source.extension));
        if source.import_count > self.config.heavy_import_threshold {
            tags.push(TAG_HEAVY_IMPORTS.to_string());
        }
        if source.dynamic_import_count > 0 {
            tags.push(TAG_CODE_SPLITTING.to_string());
        }
        tags
    }
}
