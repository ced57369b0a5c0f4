//! Thread-Safe Handle Around [`DataStore`]
//!
//! The entry map and the memory counter must change together, so the whole
//! store sits behind one `Mutex` and every call holds it for its full
//! duration. Read paths can delete expired keys, which is why this is a
//! `Mutex` rather than a `RwLock`.

use crate::storage::engine::{DataStore, StoreStats};
use crate::storage::value::{TypeTag, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use tracing::warn;

/// A cloneable, shareable handle to one [`DataStore`].
///
/// # Example
///
/// ```
/// use pebblekv::storage::{SharedStore, Value};
/// use std::thread;
///
/// let store = SharedStore::new();
/// let writer = store.clone();
///
/// thread::spawn(move || writer.set("k", 1, None)).join().unwrap();
/// assert_eq!(store.get("k"), Some(Value::from(1)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<DataStore>>,
}

impl SharedStore {
    /// Creates a handle to a new, empty store.
    pub fn new() -> Self {
        Self::from_store(DataStore::new())
    }

    /// Wraps an existing store.
    pub fn from_store(store: DataStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store for a sequence of operations that must not interleave
    /// with other callers.
    pub fn lock(&self) -> MutexGuard<'_, DataStore> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// See [`DataStore::set`].
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expires_at: Option<SystemTime>,
    ) {
        self.lock().set(key, value, expires_at);
    }

    /// See [`DataStore::get`]. Returns a clone of the stored value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// See [`DataStore::delete`].
    pub fn delete<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.lock().delete(keys)
    }

    /// See [`DataStore::exists`].
    pub fn exists<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.lock().exists(keys)
    }

    /// See [`DataStore::keys`].
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        self.lock().keys(pattern)
    }

    /// See [`DataStore::flush`].
    pub fn flush(&self) {
        self.lock().flush();
    }

    /// See [`DataStore::key_type`].
    pub fn key_type(&self, key: &str) -> Option<TypeTag> {
        self.lock().key_type(key)
    }

    /// See [`DataStore::ttl`].
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        self.lock().ttl(key)
    }

    /// Current memory estimate in bytes.
    pub fn memory_usage(&self) -> usize {
        self.lock().memory_usage()
    }

    /// Number of physically stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.lock().stats()
    }
}
