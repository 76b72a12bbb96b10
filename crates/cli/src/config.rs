use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sitelens_analysis::AnalysisConfig;
use sitelens_discovery::DiscoveryConfig;
use sitelens_indexer::IndexerConfig;
use std::fs;
use std::path::Path;

/// Optional `sitelens.toml`; every table and field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub analysis: AnalysisConfig,
    pub discovery: DiscoveryConfig,
    pub indexer: IndexerConfig,
}

impl FileConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.analysis
            .validate()
            .map_err(|e| anyhow::anyhow!("[analysis] {e}"))?;
        self.discovery
            .validate()
            .map_err(|e| anyhow::anyhow!("[discovery] {e}"))?;
        self.indexer
            .chunker
            .validate()
            .map_err(|e| anyhow::anyhow!("[indexer.chunker] {e}"))?;
        if self.indexer.batch_size == 0 {
            anyhow::bail!("[indexer] batch_size must be > 0");
        }
        Ok(())
    }
}
