use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitelens_code_chunker::CodeFragment;

/// Flat metadata map; every value is a string, number or boolean.
pub type Metadata = serde_json::Map<String, Value>;

/// Keys every fragment record must carry.
pub const REQUIRED_METADATA_KEYS: &[&str] = &[
    "file_path",
    "relative_path",
    "ext",
    "route_hint",
    "tags",
    "start_line",
    "end_line",
];

/// One fragment as handed to a retrieval store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}

impl FragmentRecord {
    /// Check that the record is a well-formed metadata record.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(VectorStoreError::invalid_metadata(&self.id, "empty id"));
        }
        for key in REQUIRED_METADATA_KEYS {
            if !self.metadata.contains_key(*key) {
                return Err(VectorStoreError::invalid_metadata(
                    &self.id,
                    format!("missing key '{key}'"),
                ));
            }
        }
        for (key, value) in &self.metadata {
            if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
                return Err(VectorStoreError::invalid_metadata(
                    &self.id,
                    format!("value of '{key}' is not a scalar"),
                ));
            }
        }
        Ok(())
    }
}

impl From<&CodeFragment> for FragmentRecord {
    fn from(fragment: &CodeFragment) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("file_path".into(), fragment.file_path.clone().into());
        metadata.insert("relative_path".into(), fragment.relative_path.clone().into());
        metadata.insert("ext".into(), fragment.extension.clone().into());
        metadata.insert(
            "route_hint".into(),
            fragment.route_hint.clone().unwrap_or_default().into(),
        );
        metadata.insert("tags".into(), fragment.tags.join(",").into());
        metadata.insert("start_line".into(), fragment.start_line.into());
        metadata.insert("end_line".into(), fragment.end_line.into());
        metadata.insert("size_bytes".into(), fragment.size_bytes.into());
        metadata.insert("line_count".into(), fragment.line_count.into());
        metadata.insert("import_count".into(), fragment.import_count.into());
        metadata.insert(
            "dynamic_import_count".into(),
            fragment.dynamic_import_count.into(),
        );

        Self {
            id: fragment.fragment_id.clone(),
            content: fragment.content.clone(),
            metadata,
        }
    }
}

/// Equality constraint on one metadata key.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFilter {
    pub key: String,
    pub value: Value,
}

impl MetadataFilter {
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        metadata.get(&self.key) == Some(&self.value)
    }
}

/// A ranked search hit. Higher `score` means more relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}
