//! # Sitelens Code Chunker
//!
//! Fixed line-window chunking of front-end source files for code retrieval.
//!
//! ## Pipeline
//!
//! ```text
//! SourceFile (path, route hint, import counts)
//!     │
//!     ├──> Split into 30-line windows (last may be shorter)
//!     │
//!     ├──> Tag each window
//!     │    ├─> route:<hint>
//!     │    ├─> ext:<extension>
//!     │    ├─> heavy-imports (import count above threshold)
//!     │    └─> code-splitting (dynamic imports present)
//!     │
//!     └──> CodeFragment[] with stable ids
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sitelens_code_chunker::{Chunker, ChunkerConfig, SourceFile};
//!
//! let content = "import React from 'react';\nexport default function Home() {}\n";
//! let source = SourceFile::from_content("/tmp/repo/pages/index.tsx", "pages/index.tsx", content)
//!     .with_route_hint("/");
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//! let fragments = chunker.chunk(&source, content);
//! assert_eq!(fragments.len(), 1);
//! assert_eq!(fragments[0].fragment_id, "pages/index.tsx-1");
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::Chunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use types::{CodeFragment, SourceFile, TAG_CODE_SPLITTING, TAG_HEAVY_IMPORTS};
