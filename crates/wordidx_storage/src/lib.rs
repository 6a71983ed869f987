//! # wordidx Storage
//!
//! Places where persisted index containers live.
//!
//! A container is written and read as a whole: the loader always reads the
//! full file before parsing it, and the writer always replaces it in one
//! step. Stores are **opaque byte holders** and never interpret the
//! container format.
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and in-process hand-off
//! - [`FileStore`] - Persistent storage with write-then-rename replacement
//!
//! ## Example
//!
//! ```rust
//! use wordidx_storage::{ContainerStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.store(b"hello world").unwrap();
//! assert_eq!(store.load_required().unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::ContainerStore;
