//! Durable key/value persistence with transparent JSON encoding.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`KeyValueStore`] is the only persistence primitive in the crate. Layouts,
//! open flags, ownership tokens, and widget content all go through it. The
//! actual bytes live in a [`StorageBackend`]: `localStorage` in the browser
//! (feature `web`), an in-memory map for tests, or whatever the host supplies.
//!
//! ERROR HANDLING
//! ==============
//! Reads never fail: absent keys, backend errors, and values that no longer
//! parse all fall back to the caller's default. Writes are best-effort: a
//! failure (quota exceeded, storage disabled) is logged and reported as
//! `false`, and the caller's in-memory state stays authoritative for the
//! session. Nothing here is transactional across keys.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Error reported by a [`StorageBackend`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend refused the write because its capacity is exhausted.
    #[error("storage quota exceeded")]
    Quota,
    /// No storage is available in this environment (e.g. disabled by the user).
    #[error("storage backend unavailable")]
    Unavailable,
    /// Any other backend failure, with its description.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Raw string storage. Implementations must be synchronous and cheap.
pub trait StorageBackend {
    /// Read the raw value for `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure if the storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Quota`] when capacity is exhausted, or another
    /// variant when the storage cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure if the storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure if the storage cannot be enumerated.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-memory backend with an optional byte quota over keys plus values.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that rejects writes once `bytes` of keys and values are stored.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { entries: RefCell::new(BTreeMap::new()), quota_bytes: Some(bytes) }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            if self.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StoreError::Quota);
            }
        }
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

// =============================================================================
// LOCAL STORAGE BACKEND
// =============================================================================

/// Browser `window.localStorage`.
#[cfg(feature = "web")]
pub struct LocalStorageBackend {
    storage: web_sys::Storage,
}

#[cfg(feature = "web")]
impl LocalStorageBackend {
    /// Bind to the current window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] outside a window context or when
    /// storage access is denied.
    pub fn from_window() -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or(StoreError::Unavailable)?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) | Err(_) => Err(StoreError::Unavailable),
        }
    }
}

#[cfg(feature = "web")]
fn js_store_error(err: &wasm_bindgen::JsValue) -> StoreError {
    let name = match js_sys::Reflect::get(err, &wasm_bindgen::JsValue::from_str("name")) {
        Ok(v) => v.as_string().unwrap_or_default(),
        Err(_) => String::new(),
    };
    if name == "QuotaExceededError" || name == "NS_ERROR_DOM_QUOTA_REACHED" {
        StoreError::Quota
    } else {
        StoreError::Backend(format!("{err:?}"))
    }
}

#[cfg(feature = "web")]
impl StorageBackend for LocalStorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(|e| js_store_error(&e))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| js_store_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(|e| js_store_error(&e))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let len = self.storage.length().map_err(|e| js_store_error(&e))?;
        let mut out = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(|e| js_store_error(&e))? {
                out.push(key);
            }
        }
        Ok(out)
    }
}

// =============================================================================
// KEY VALUE STORE
// =============================================================================

/// Namespaced JSON view over a [`StorageBackend`].
///
/// Keys passed in are prefixed with `"<namespace>:"` so the deck never
/// collides with the host page's own storage. Cloning shares the backend.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Rc<dyn StorageBackend>,
    namespace: String,
}

impl KeyValueStore {
    #[must_use]
    pub fn new(backend: Rc<dyn StorageBackend>, namespace: impl Into<String>) -> Self {
        Self { backend, namespace: namespace.into() }
    }

    /// A store over a fresh [`MemoryBackend`].
    #[must_use]
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self::new(Rc::new(MemoryBackend::new()), namespace)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn full_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_owned()
        } else {
            format!("{}:{key}", self.namespace)
        }
    }

    /// Read `key`, or `default` if it is absent, unreadable, or fails to parse.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    /// Read `key`, `None` if it is absent, unreadable, or fails to parse.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full = self.full_key(key);
        let raw = match self.backend.read(&full) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %full, error = %e, "store read failed; using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %full, error = %e, "stored value failed to parse; using default");
                None
            }
        }
    }

    /// Serialize and write `value` under `key`. Returns whether the write landed.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let full = self.full_key(key);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %full, error = %e, "value failed to serialize; not persisted");
                return false;
            }
        };
        match self.backend.write(&full, &raw) {
            Ok(()) => {
                debug!(key = %full, bytes = raw.len(), "store write");
                true
            }
            Err(e) => {
                warn!(key = %full, error = %e, "store write failed; keeping in-memory state");
                false
            }
        }
    }

    /// Delete `key`. Returns whether the backend accepted the removal.
    pub fn remove(&self, key: &str) -> bool {
        let full = self.full_key(key);
        match self.backend.remove(&full) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %full, error = %e, "store remove failed");
                false
            }
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.read(&self.full_key(key)), Ok(Some(_)))
    }

    /// Keys in this namespace starting with `prefix`, with the namespace stripped.
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "store key listing failed");
                return Vec::new();
            }
        };
        let ns_prefix = self.full_key("");
        let mut out: Vec<String> = keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(&ns_prefix).map(str::to_owned))
            .filter(|k| k.starts_with(prefix))
            .collect();
        out.sort();
        out
    }
}
