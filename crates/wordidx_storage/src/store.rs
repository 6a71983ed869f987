//! Container store trait definition.

use crate::error::{StorageError, StorageResult};

/// Where a persisted container lives.
///
/// Stores are **opaque byte holders**. A container is always replaced as a
/// whole and read back as a whole; stores never interpret the bytes.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `store`
/// - a failed `store` leaves the previous content readable
/// - stores must be `Send + Sync` so a writer thread can own one
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait ContainerStore: Send + Sync {
    /// Returns the stored bytes, or `None` if nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the stored bytes.
    ///
    /// When this returns successfully the bytes are durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes could not be written in full.
    fn store(&self, bytes: &[u8]) -> StorageResult<()>;

    /// Returns true if a container has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be queried.
    fn exists(&self) -> StorageResult<bool>;

    /// Human-readable location, used in logs and errors.
    fn describe(&self) -> String;

    /// Like [`load`](Self::load), but treats a missing container as an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if nothing was ever stored.
    fn load_required(&self) -> StorageResult<Vec<u8>> {
        self.load()?
            .ok_or_else(|| StorageError::NotFound(self.describe()))
    }
}
