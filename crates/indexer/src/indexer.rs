use crate::checkout::{RepoCheckout, RepoFetcher};
use crate::error::{IndexerError, Result};
use crate::scanner::{FileScanner, ScannedFile};
use crate::stats::IndexStats;
use serde::{Deserialize, Serialize};
use sitelens_code_chunker::{Chunker, ChunkerConfig, CodeFragment};
use sitelens_vector_store::{FragmentRecord, RetrievalStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Indexing knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Upper bound on records per upsert; further capped by the store's own limit
    pub batch_size: usize,

    /// Parent directory for checkouts. System temp dir when unset.
    pub scratch_dir: Option<PathBuf>,

    pub chunker: ChunkerConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            scratch_dir: None,
            chunker: ChunkerConfig::default(),
        }
    }
}

/// Repository indexer: checkout, scan, chunk, persist.
pub struct CodeIndexer {
    store: Arc<dyn RetrievalStore>,
    fetcher: Arc<dyn RepoFetcher>,
    chunker: Chunker,
    config: IndexerConfig,
}

impl CodeIndexer {
    pub fn new(
        store: Arc<dyn RetrievalStore>,
        fetcher: Arc<dyn RepoFetcher>,
        config: IndexerConfig,
    ) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(IndexerError::Other("batch_size must be > 0".to_string()));
        }
        let chunker = Chunker::new(config.chunker.clone())?;
        Ok(Self {
            store,
            fetcher,
            chunker,
            config,
        })
    }

    /// Index a remote repository into `collection`.
    ///
    /// The checkout lives in a fresh temporary directory which is removed
    /// whether indexing succeeds or fails.
    pub async fn index_repository(&self, repo_url: &str, collection: &str) -> Result<IndexStats> {
        let start = Instant::now();
        let scratch_root = self
            .config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        log::info!("Indexing {repo_url} into collection '{collection}'");
        let checkout = RepoCheckout::acquire(self.fetcher.as_ref(), repo_url, &scratch_root).await?;

        let outcome = self.index_directory(checkout.path(), collection).await;
        if let Err(e) = checkout.release() {
            log::warn!("Failed to remove checkout for {repo_url}: {e}");
        }

        let mut stats = outcome?;
        stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {repo_url}: {} files, {} fragments in {} batches ({} ms)",
            stats.files,
            stats.fragments,
            stats.batches,
            stats.time_ms
        );
        Ok(stats)
    }

    /// Index an already materialized working tree.
    pub async fn index_directory(&self, root: &Path, collection: &str) -> Result<IndexStats> {
        let start = Instant::now();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.display().to_string()));
        }

        let scan_root = root.to_path_buf();
        let files = tokio::task::spawn_blocking(move || FileScanner::new(scan_root).scan())
            .await
            .map_err(|e| IndexerError::Other(format!("scan task failed: {e}")))?;

        let mut stats = IndexStats::new();
        let fragments = self.chunk_all(&files, &mut stats);
        stats.batches = self.persist(collection, &fragments).await?;
        stats.add_fragments(fragments.len());
        stats.time_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    fn chunk_all(&self, files: &[ScannedFile], stats: &mut IndexStats) -> Vec<CodeFragment> {
        let mut fragments = Vec::new();
        for file in files {
            stats.add_file(&file.source.extension, file.source.line_count);
            let chunks = self.chunker.chunk(&file.source, &file.content);
            log::debug!(
                "{} -> {} fragments",
                file.source.relative_path,
                chunks.len()
            );
            fragments.extend(chunks);
        }
        fragments
    }

    /// Upload fragments in batches. Every record is validated before the
    /// first write, so a malformed fragment leaves the collection untouched.
    ///
    /// Returns the number of batches sent.
    pub async fn persist(&self, collection: &str, fragments: &[CodeFragment]) -> Result<usize> {
        let records: Vec<FragmentRecord> = fragments.iter().map(FragmentRecord::from).collect();
        for record in &records {
            record.validate()?;
        }

        let batch_size = self
            .config
            .batch_size
            .min(self.store.max_batch_size())
            .max(1);

        let mut batches = 0;
        for batch in records.chunks(batch_size) {
            self.store.upsert(collection, batch).await?;
            batches += 1;
            log::debug!(
                "Upserted batch {batches} ({} records) into '{collection}'",
                batch.len()
            );
        }
        Ok(batches)
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }
}
