//! # Sitelens Vector Store
//!
//! Retrieval-store contract for indexed code fragments, plus two backends.
//!
//! ## Architecture
//!
//! ```text
//! CodeFragment[]
//!     │
//!     ├──> FragmentRecord (id, content, flat metadata map)
//!     │      └─> validated before every upsert
//!     │
//!     ├──> Embedder (Gemini embeddings | feature hashing)
//!     │
//!     └──> RetrievalStore
//!            ├─> InMemoryStore (cosine over local vectors)
//!            └─> ChromaClient (Chroma server over HTTP)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitelens_vector_store::{HashingEmbedder, InMemoryStore, MetadataFilter, RetrievalStore};
//!
//! #[tokio::main]
//! async fn main() -> sitelens_vector_store::Result<()> {
//!     let store = InMemoryStore::new(Arc::new(HashingEmbedder::default()));
//!     let filter = MetadataFilter::eq("route_hint", "/about");
//!     let matches = store.query("shop", "render blocking stylesheet", 5, Some(&filter)).await?;
//!     for m in matches {
//!         println!("{}: {:.3}", m.id, m.score);
//!     }
//!     Ok(())
//! }
//! ```

mod chroma;
mod embeddings;
mod error;
mod memory;
mod store;
mod types;

pub use chroma::ChromaClient;
pub use embeddings::{
    cosine_similarity, embed_checked, Embedder, GeminiEmbedder, HashingEmbedder,
};
pub use error::{Result, VectorStoreError};
pub use memory::InMemoryStore;
pub use store::{RetrievalStore, DEFAULT_MAX_BATCH_SIZE};
pub use types::{FragmentRecord, Metadata, MetadataFilter, QueryMatch, REQUIRED_METADATA_KEYS};

// Re-export chunker types for convenience
pub use sitelens_code_chunker::CodeFragment;
