use ignore::WalkBuilder;
use sitelens_code_chunker::SourceFile;
use std::path::{Path, PathBuf};

/// A selected file together with its text.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub source: SourceFile,
    pub content: String,
}

/// Scanner for finding front-end source files in a checkout
pub struct FileScanner {
    root: PathBuf,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Walk the tree and return every file that passes the allow-list, in
    /// path order.
    pub fn scan(&self) -> Vec<ScannedFile> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| !FileScanner::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_path(path, &self.root) else {
                continue;
            };
            let extension = extension_of(&relative);
            if !is_included(&relative, &extension) {
                continue;
            }

            if let Ok(meta) = entry.metadata() {
                if meta.len() > MAX_FILE_SIZE_BYTES {
                    log::debug!(
                        "Skipping large file {} ({} bytes > {})",
                        path.display(),
                        meta.len(),
                        MAX_FILE_SIZE_BYTES
                    );
                    continue;
                }
            }

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    log::debug!("Skipping unreadable file {}: {e}", path.display());
                    continue;
                }
            };

            let mut source =
                SourceFile::from_content(path.to_string_lossy(), relative.clone(), &content);
            source.route_hint = route_hint(&relative, &extension);
            files.push(ScannedFile { source, content });
        }

        log::info!("Found {} relevant source files", files.len());
        files
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let std::path::Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn extension_of(relative: &str) -> String {
    Path::new(relative)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Scripts only under page/component roots, stylesheets only under `src/`,
/// markup anywhere.
pub(crate) fn is_included(relative: &str, extension: &str) -> bool {
    if SCRIPT_EXTENSIONS.contains(&extension) {
        return SCRIPT_ROOTS.iter().any(|root| relative.starts_with(root));
    }
    if STYLE_EXTENSIONS.contains(&extension) {
        return relative.starts_with(STYLE_ROOT);
    }
    MARKUP_EXTENSIONS.contains(&extension)
}

/// `pages/blog/index.tsx` -> `/blog`, `src/pages/about.jsx` -> `/about`,
/// `pages/index.js` -> `/`.
pub(crate) fn route_hint(relative: &str, extension: &str) -> Option<String> {
    let rest = PAGE_ROOTS
        .iter()
        .find_map(|root| relative.strip_prefix(root))?;
    let rest = if extension.is_empty() {
        rest
    } else {
        let suffix_len = extension.len() + 1;
        rest.get(..rest.len().saturating_sub(suffix_len)).unwrap_or(rest)
    };
    let rest = if rest == "index" {
        ""
    } else {
        rest.strip_suffix("/index").unwrap_or(rest)
    };
    Some(format!("/{rest}"))
}

const SCRIPT_EXTENSIONS: &[&str] = &["js", "ts", "jsx", "tsx"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less", "styl"];
const MARKUP_EXTENSIONS: &[&str] = &["html"];

const SCRIPT_ROOTS: &[&str] = &["pages/", "src/pages/", "src/components/"];
const STYLE_ROOT: &str = "src/";
const PAGE_ROOTS: &[&str] = &["src/pages/", "pages/"];

const IGNORED_SCOPES: &[&str] = &[".git", "node_modules"];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, body: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn inclusion_rules_follow_directory_conventions() {
        assert!(is_included("pages/index.tsx", "tsx"));
        assert!(is_included("src/pages/a.js", "js"));
        assert!(is_included("src/components/Nav.jsx", "jsx"));
        assert!(!is_included("src/utils/fetch.ts", "ts"));
        assert!(!is_included("lib/pages/a.ts", "ts"));

        assert!(is_included("src/styles/app.scss", "scss"));
        assert!(!is_included("styles/app.css", "css"));

        assert!(is_included("public/index.html", "html"));
        assert!(is_included("index.html", "html"));

        assert!(!is_included("src/pages/data.json", "json"));
    }

    #[test]
    fn route_hints_strip_prefix_extension_and_index() {
        assert_eq!(route_hint("pages/index.tsx", "tsx").as_deref(), Some("/"));
        assert_eq!(route_hint("pages/about.tsx", "tsx").as_deref(), Some("/about"));
        assert_eq!(route_hint("src/pages/blog/index.js", "js").as_deref(), Some("/blog"));
        assert_eq!(route_hint("src/pages/blog/[slug].jsx", "jsx").as_deref(), Some("/blog/[slug]"));
        assert_eq!(route_hint("pages/reindex.ts", "ts").as_deref(), Some("/reindex"));
        assert_eq!(route_hint("src/components/Nav.tsx", "tsx"), None);
    }

    #[test]
    fn scan_selects_relevant_files_and_skips_dependencies() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "pages/index.tsx", "import React from 'react';\n");
        write(root, "src/components/Hero.tsx", "export const Hero = () => null;\n");
        write(root, "src/styles/main.css", "body { margin: 0 }\n");
        write(root, "src/lib/api.ts", "export {}\n");
        write(root, "node_modules/react/index.html", "<html></html>\n");
        write(root, "README.md", "# readme\n");

        let files = FileScanner::new(root).scan();
        let relative: Vec<&str> = files
            .iter()
            .map(|f| f.source.relative_path.as_str())
            .collect();

        assert_eq!(
            relative,
            vec!["pages/index.tsx", "src/components/Hero.tsx", "src/styles/main.css"]
        );
        assert_eq!(files[0].source.route_hint.as_deref(), Some("/"));
        assert_eq!(files[0].source.import_count, 1);
        assert!(files[1].source.route_hint.is_none());
        assert_eq!(files[2].content, "body { margin: 0 }\n");
    }
}
