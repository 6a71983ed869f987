//! # wordidx Core
//!
//! Concurrent word-frequency index for crawled documents.
//!
//! This crate provides:
//! - [`Index`]: a thread-safe balanced tree from token to frequency
//! - [`TraversalEngine`]: ordered parallel flatten and serialize
//! - [`IndexCollection`]: one index per document url, persisted as a single
//!   container through any [`ContainerStore`](wordidx_storage::ContainerStore)
//! - Tokenizing, cosine similarity and deadline-bounded bulk ingestion
//!
//! ## Example
//!
//! ```
//! use wordidx_core::{read_all, write_all, Config, IndexCollection};
//! use wordidx_storage::MemoryStore;
//!
//! let mut collection = IndexCollection::new();
//! collection.document("a.com").add_text("cat cat");
//! collection.document("b.com").add_text("dog");
//!
//! let store = MemoryStore::new();
//! write_all(&collection, &store).unwrap();
//!
//! let (loaded, report) = read_all(&store, &Config::default()).unwrap();
//! assert!(report.is_complete());
//! assert_eq!(loaded.get("a.com").unwrap().get("cat").unwrap().unwrap().frequency(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod collection;
pub mod config;
mod entry;
mod error;
pub mod index;
pub mod ingest;
pub mod persistence;
pub mod similarity;
pub mod tokenize;
pub mod traversal;

pub use collection::IndexCollection;
pub use config::{Config, RecordErrorPolicy};
pub use entry::WordEntry;
pub use error::{CoreError, CoreResult};
pub use index::{Index, IndexStats};
pub use ingest::{IngestReport, Ingestor};
pub use persistence::{read_all, reconstruct, write_all, LoadReport, SkippedDocument};
pub use similarity::{cosine_similarity, rank, SimilarityResult};
pub use traversal::TraversalEngine;
