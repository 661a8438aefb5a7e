//! File-backed [`StorageBackend`]: one JSON object shared by every process.
//!
//! DESIGN
//! ======
//! The file is re-read on every operation, so several `sidebar` processes
//! pointed at one path see each other's writes the way browser tabs share
//! `localStorage`. Writes go to a sibling temp file that is renamed over the
//! original, so a reader never observes a half-written object.
//!
//! LOCKING
//! =======
//! Every write is a load-modify-save of the whole object. Two processes
//! writing different keys at once would each save their own stale copy, so
//! the whole cycle runs under an exclusive advisory lock on `<path>.lock`.
//! Writes to the same key stay last-writer-wins, as in `localStorage`.
//! Reads take no lock; the rename keeps them consistent.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use deck::store::{StorageBackend, StoreError};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileBackend {
    /// Use `path`, creating an empty store if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut lock_path = OsString::from(path.as_os_str());
        lock_path.push(".lock");
        let backend = Self { path, lock_path: lock_path.into() };
        backend.locked(|| {
            if !backend.path.exists() {
                backend.save(&BTreeMap::new())?;
                info!(path = %backend.path.display(), "created store file");
            }
            Ok(())
        })?;
        Ok(backend)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a load-modify-save cycle while holding the store's lock file.
    fn locked<R>(&self, cycle: impl FnOnce() -> Result<R, StoreError>) -> Result<R, StoreError> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| io_error(&e))?;
        lock.lock().map_err(|e| io_error(&e))?;
        let result = cycle();
        if let Err(e) = lock.unlock() {
            warn!(path = %self.lock_path.display(), error = %e, "failed to unlock store; released on close");
        }
        result
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store file is corrupt; starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Backend(e.to_string()))?;
        let tmp = self.path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, raw).map_err(|e| io_error(&e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp store file");
            }
            io_error(&e)
        })
    }
}

fn io_error(err: &std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::StorageFull {
        StoreError::Quota
    } else {
        StoreError::Backend(err.to_string())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.locked(|| {
            let mut entries = self.load()?;
            entries.insert(key.to_owned(), value.to_owned());
            self.save(&entries)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.locked(|| {
            let mut entries = self.load()?;
            if entries.remove(key).is_some() {
                self.save(&entries)?;
            }
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.into_keys().collect())
    }
}

#[cfg(test)]
#[path = "file_store_test.rs"]
mod tests;
