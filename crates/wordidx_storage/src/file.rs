//! File-based container store.

use crate::error::{StorageError, StorageResult};
use crate::store::ContainerStore;
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A container store backed by a single file.
///
/// # Durability
///
/// `store()` writes to `<path>.tmp`, calls `File::sync_all()`, then renames
/// the temporary file over `<path>`. A crash mid-write leaves the previous
/// container in place, so a reader only ever sees what was last flushed.
///
/// # Example
///
/// ```no_run
/// use wordidx_storage::{ContainerStore, FileStore};
///
/// let store = FileStore::new("index.wdx");
/// store.store(b"container bytes").unwrap();
/// let bytes = store.load_required().unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store for `path`. The file is not touched until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store, creating the parent directories of `path` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_create_dirs(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::file(parent, e))?;
        }
        Ok(Self::new(path))
    }

    /// Returns the path of the container file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    #[cfg(unix)]
    fn sync_parent(&self) -> io::Result<()> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => File::open(parent)?.sync_all(),
            None => Ok(()),
        }
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> io::Result<()> {
        Ok(())
    }
}

impl ContainerStore for FileStore {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = %self.path.display(), bytes = bytes.len(), "loaded container");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::file(&self.path, e)),
        }
    }

    fn store(&self, bytes: &[u8]) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let tmp = self.temp_path();

        let write_tmp = || -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::file(&tmp, e));
        }

        fs::rename(&tmp, &self.path).map_err(|e| StorageError::file(&self.path, e))?;
        self.sync_parent()
            .map_err(|e| StorageError::file(&self.path, e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "stored container");
        Ok(())
    }

    fn exists(&self) -> StorageResult<bool> {
        self.path
            .try_exists()
            .map_err(|e| StorageError::file(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.wdx"));
        assert!(store.load().unwrap().is_none());
        assert!(!store.exists().unwrap());
        assert!(matches!(store.load_required(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn store_then_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("index.wdx"));
        store.store(b"hello").unwrap();
        assert!(store.exists().unwrap());
        assert_eq!(store.load_required().unwrap(), b"hello");
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn store_replaces_whole_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("index.wdx"));
        store.store(b"a much longer first container").unwrap();
        store.store(b"short").unwrap();
        assert_eq!(store.load_required().unwrap(), b"short");
    }

    #[test]
    fn creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("index.wdx");
        let store = FileStore::with_create_dirs(&path).unwrap();
        store.store(&[1, 2, 3]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn reopened_store_sees_flushed_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.wdx");
        FileStore::new(&path).store(b"persisted").unwrap();
        assert_eq!(FileStore::new(&path).load_required().unwrap(), b"persisted");
    }
}
