//! Test fixtures.
//!
//! Ready-made indexes, collections and stores for tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wordidx_core::{Index, IndexCollection, WordEntry};
use wordidx_storage::FileStore;

/// Builds an index by adding each token in order.
pub fn index_from_tokens<S: AsRef<str>>(tokens: &[S]) -> Index {
    let index = Index::new();
    for token in tokens {
        index.add(token.as_ref()).expect("Fixture tokens must not be empty");
    }
    index
}

/// Builds a collection from `(url, text)` pairs, tokenizing each text.
pub fn collection_from_texts(documents: &[(&str, &str)]) -> IndexCollection {
    let mut collection = IndexCollection::new();
    for (url, text) in documents {
        collection.document(url).add_text(text);
    }
    collection
}

/// The two-document collection: `a.com` with `cat` twice, `b.com` with `dog` once.
pub fn sample_collection() -> IndexCollection {
    let mut collection = IndexCollection::new();
    let a = collection.document("a.com");
    a.add("cat").expect("Valid token");
    a.add("cat").expect("Valid token");
    collection.document("b.com").add("dog").expect("Valid token");
    collection
}

/// Flattens an index to `(token, frequency)` pairs.
pub fn entries(index: &Index) -> Vec<(String, u32)> {
    index.flatten().into_iter().map(WordEntry::into_parts).collect()
}

/// Counts tokens the slow way, for comparison against an index.
pub fn expected_counts<S: AsRef<str>>(tokens: &[S]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_ref().to_owned()).or_insert(0) += 1;
    }
    counts
}

/// Flattens a collection to `url -> (token, frequency)` pairs.
pub fn collection_entries(collection: &IndexCollection) -> BTreeMap<String, Vec<(String, u32)>> {
    collection
        .iter()
        .map(|(url, index)| (url.clone(), entries(index)))
        .collect()
}

/// A file store inside a temporary directory, removed on drop.
pub struct TestStore {
    /// The store.
    pub store: FileStore,
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store at `<tempdir>/index.bin`.
    pub fn new() -> Self {
        Self::named("index.bin")
    }

    /// Creates a store at `<tempdir>/<name>`, creating parent directories.
    pub fn named(name: impl AsRef<Path>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_create_dirs(temp_dir.path().join(name))
            .expect("Failed to create file store");
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the container file.
    pub fn path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
