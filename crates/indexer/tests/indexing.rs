use async_trait::async_trait;
use pretty_assertions::assert_eq;
use sitelens_indexer::{CodeIndexer, IndexerConfig, IndexerError, RepoFetcher};
use sitelens_vector_store::{
    FragmentRecord, MetadataFilter, QueryMatch, Result as StoreResult, RetrievalStore,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Writes a small Next.js-style tree instead of cloning.
struct FixtureFetcher;

#[async_trait]
impl RepoFetcher for FixtureFetcher {
    async fn fetch(&self, _repo_url: &str, dest: &Path) -> sitelens_indexer::Result<()> {
        let files: &[(&str, String)] = &[
            ("pages/index.tsx", numbered(65)),
            ("pages/blog/index.tsx", numbered(10)),
            ("src/components/Nav.tsx", "import a from 'a';\nimport('b');\n".to_string()),
            ("src/styles/site.css", numbered(3)),
            ("node_modules/lib/index.html", numbered(3)),
            ("server/api.ts", numbered(3)),
        ];
        for (relative, body) in files {
            let path = dest.join(relative);
            std::fs::create_dir_all(path.parent().unwrap())?;
            std::fs::write(path, body)?;
        }
        Ok(())
    }
}

struct FailingFetcher;

#[async_trait]
impl RepoFetcher for FailingFetcher {
    async fn fetch(&self, repo_url: &str, dest: &Path) -> sitelens_indexer::Result<()> {
        std::fs::write(dest.join("partial"), "x")?;
        Err(IndexerError::CloneFailed {
            url: repo_url.to_string(),
            reason: "repository not found".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingStore {
    batches: Mutex<Vec<Vec<FragmentRecord>>>,
}

#[async_trait]
impl RetrievalStore for RecordingStore {
    fn max_batch_size(&self) -> usize {
        4
    }

    async fn upsert(&self, _collection: &str, batch: &[FragmentRecord]) -> StoreResult<()> {
        self.batches.lock().unwrap().push(batch.to_vec());
        Ok(())
    }

    async fn query(
        &self,
        _collection: &str,
        _query_text: &str,
        _top_k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> StoreResult<Vec<QueryMatch>> {
        Ok(Vec::new())
    }
}

fn numbered(lines: usize) -> String {
    (1..=lines).map(|i| format!("const l{i} = {i};\n")).collect()
}

fn config(scratch: &Path) -> IndexerConfig {
    IndexerConfig {
        batch_size: 50,
        scratch_dir: Some(scratch.to_path_buf()),
        ..IndexerConfig::default()
    }
}

#[tokio::test]
async fn indexes_repository_and_removes_checkout() {
    let scratch = tempdir().unwrap();
    let store = Arc::new(RecordingStore::default());
    let indexer =
        CodeIndexer::new(store.clone(), Arc::new(FixtureFetcher), config(scratch.path())).unwrap();

    let stats = indexer
        .index_repository("https://example.com/site.git", "site")
        .await
        .unwrap();

    // index.tsx: 3 windows, blog/index.tsx: 1, Nav.tsx: 1, site.css: 1
    assert_eq!(stats.files, 4);
    assert_eq!(stats.fragments, 6);
    assert_eq!(stats.batches, 2);

    let batches = store.batches.lock().unwrap();
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 2]);

    let records: Vec<&FragmentRecord> = batches.iter().flatten().collect();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "pages/blog/index.tsx-1",
            "pages/index.tsx-1",
            "pages/index.tsx-31",
            "pages/index.tsx-61",
            "src/components/Nav.tsx-1",
            "src/styles/site.css-1",
        ]
    );
    assert_eq!(records[0].metadata["route_hint"], "/blog");
    assert_eq!(records[1].metadata["route_hint"], "/");
    assert_eq!(records[3].metadata["end_line"], 65);
    assert_eq!(records[4].metadata["route_hint"], "");
    assert_eq!(records[4].metadata["tags"], "ext:tsx,code-splitting");

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn failed_clone_still_removes_checkout() {
    let scratch = tempdir().unwrap();
    let store = Arc::new(RecordingStore::default());
    let indexer =
        CodeIndexer::new(store.clone(), Arc::new(FailingFetcher), config(scratch.path())).unwrap();

    let err = indexer
        .index_repository("https://example.com/missing.git", "site")
        .await
        .unwrap_err();

    assert!(matches!(err, IndexerError::CloneFailed { .. }));
    assert!(store.batches.lock().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
