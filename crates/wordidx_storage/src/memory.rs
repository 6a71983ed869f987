//! In-memory container store for testing.

use crate::error::StorageResult;
use crate::store::ContainerStore;
use parking_lot::RwLock;

/// A container store kept in memory.
///
/// Useful for tests and for handing a container between threads without
/// touching the file system.
///
/// # Example
///
/// ```rust
/// use wordidx_storage::{ContainerStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// assert!(store.load().unwrap().is_none());
/// store.store(b"bytes").unwrap();
/// assert_eq!(store.load().unwrap().as_deref(), Some(&b"bytes"[..]));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `data`.
    ///
    /// Useful for feeding hand-built or damaged containers to a loader.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
        }
    }

    /// Returns the size of the stored container, or 0 if empty.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().as_ref().map_or(0, Vec::len)
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_none()
    }
}

impl ContainerStore for MemoryStore {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn store(&self, bytes: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(bytes.to_vec());
        Ok(())
    }

    fn exists(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_some())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    #[test]
    fn starts_empty() {
        let store = MemoryStore::new();
        assert!(!store.exists().unwrap());
        assert!(store.is_empty());
        assert!(matches!(store.load_required(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn store_replaces_content() {
        let store = MemoryStore::new();
        store.store(b"first").unwrap();
        store.store(b"second").unwrap();
        assert_eq!(store.load_required().unwrap(), b"second");
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn with_data_is_loadable() {
        let store = MemoryStore::with_data(vec![1, 2, 3]);
        assert!(store.exists().unwrap());
        assert_eq!(store.load().unwrap(), Some(vec![1, 2, 3]));
    }
}
