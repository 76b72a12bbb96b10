//! # Sitelens Indexer
//!
//! Turns a source repository into searchable code fragments.
//!
//! ## Pipeline
//!
//! ```text
//! Repository URL
//!     │
//!     ├──> Scoped checkout (shallow, single-branch clone into a temp dir)
//!     │
//!     ├──> File Scanner (allow-listed extensions under page/component/src roots)
//!     │      └─> Source files + route hints
//!     │
//!     ├──> Chunker (30-line windows)
//!     │      └─> Code fragments
//!     │
//!     └──> Retrieval store (validated batches)
//! ```
//!
//! The checkout directory is removed on every exit path, including errors.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitelens_indexer::{CodeIndexer, GitCli, IndexerConfig};
//! use sitelens_vector_store::{HashingEmbedder, InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> sitelens_indexer::Result<()> {
//!     let store = Arc::new(InMemoryStore::new(Arc::new(HashingEmbedder::default())));
//!     let indexer = CodeIndexer::new(store, Arc::new(GitCli::default()), IndexerConfig::default())?;
//!     let stats = indexer
//!         .index_repository("https://github.com/vercel/next-learn", "next-learn")
//!         .await?;
//!
//!     println!("Indexed {} files, {} fragments", stats.files, stats.fragments);
//!     Ok(())
//! }
//! ```

mod checkout;
mod error;
mod indexer;
mod scanner;
mod stats;

pub use checkout::{GitCli, RepoCheckout, RepoFetcher};
pub use error::{IndexerError, Result};
pub use indexer::{CodeIndexer, IndexerConfig};
pub use scanner::{FileScanner, ScannedFile};
pub use stats::IndexStats;
