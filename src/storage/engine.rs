//! Typed Key-Value Store with Lazy Expiry
//!
//! This module implements the core data store for PebbleKV.
//! Each key maps to an [`Entry`] holding a typed [`Value`], the value's
//! [`TypeTag`], and an optional absolute expiry time.
//!
//! ## Design Decisions
//!
//! 1. **Lazy Expiry Only**: There is no background sweeper. An expired key is
//!    removed the moment a read path (`get`, `exists`, `keys`, ...) inspects it.
//! 2. **Incremental Memory Estimate**: `memory_usage` is adjusted on every
//!    insert and removal and is never recomputed by scanning the map.
//! 3. **Single Owner**: `DataStore` is a plain `&mut self` structure. Callers
//!    that need sharing wrap it in a [`SharedStore`](super::SharedStore).
//!
//! ## Memory Model
//!
//! ```text
//! cost(key, value) = len(key) + len(text(value)) + 64
//! ```
//!
//! Lengths are UTF-8 byte lengths. `text(value)` is the value's `Display`
//! form, so containers are costed by their flattened text.

use crate::storage::glob::GlobPattern;
use crate::storage::value::{TypeTag, Value};
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};

/// Fixed per-entry overhead added to every cost estimate.
pub const ENTRY_OVERHEAD: usize = 64;

/// Estimated storage cost of one entry.
///
/// Computed identically on insert and on removal, always from the value
/// actually stored, so the running total never drifts.
pub fn entry_cost(key: &str, value: &Value) -> usize {
    key.len() + text_len(value) + ENTRY_OVERHEAD
}

/// Byte length of a value's textual form, without building the string.
fn text_len(value: &Value) -> usize {
    struct Counter(usize);

    impl fmt::Write for Counter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0 += s.len();
            Ok(())
        }
    }

    let mut counter = Counter(0);
    // Counter never fails
    let _ = fmt::write(&mut counter, format_args!("{}", value));
    counter.0
}

/// Converts a relative TTL into the absolute expiry time `set` expects.
///
/// Returns `None` when `now + ttl` is not representable as a `SystemTime`.
pub fn expires_in(ttl: Duration) -> Option<SystemTime> {
    SystemTime::now().checked_add(ttl)
}

/// A stored record.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The value exactly as it was given to `set`
    pub value: Value,
    /// Classification of `value`, fixed at insert time
    pub type_tag: TypeTag,
    /// When this entry expires (None = never expires)
    pub expires_at: Option<SystemTime>,
}

impl Entry {
    /// Creates an entry, classifying the value.
    pub fn new(value: Value, expires_at: Option<SystemTime>) -> Self {
        Self {
            type_tag: TypeTag::of(&value),
            value,
            expires_at,
        }
    }

    /// Checks if this entry has expired as of `now`.
    #[inline]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Returns the time left before expiry, or None if no expiry.
    pub fn ttl_at(&self, now: SystemTime) -> Option<Duration> {
        self.expires_at
            .map(|exp| exp.duration_since(now).unwrap_or(Duration::ZERO))
    }
}

/// The in-memory data store.
///
/// # Example
///
/// ```
/// use pebblekv::storage::{expires_in, DataStore, TypeTag, Value};
/// use std::time::Duration;
///
/// let mut store = DataStore::new();
///
/// store.set("name", "Ariz", None);
/// assert_eq!(store.get("name"), Some(&Value::from("Ariz")));
///
/// store.set("tags", Value::set(["a", "b"]), expires_in(Duration::from_secs(60)));
/// assert_eq!(store.key_type("tags"), Some(TypeTag::Set));
///
/// assert_eq!(store.delete(["name", "missing"]), 1);
/// ```
pub struct DataStore {
    /// Key to record
    entries: HashMap<String, Entry>,

    /// Running sum of `entry_cost` over every entry in `entries`
    memory_usage: usize,

    /// Statistics: total GET operations
    get_count: u64,

    /// Statistics: total SET operations
    set_count: u64,

    /// Statistics: total keys removed by DEL
    del_count: u64,

    /// Statistics: number of expired keys removed on access
    expired_count: u64,
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("entries", &self.entries.len())
            .field("memory_usage", &self.memory_usage)
            .field("get_count", &self.get_count)
            .field("set_count", &self.set_count)
            .finish()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty store with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            memory_usage: 0,
            get_count: 0,
            set_count: 0,
            del_count: 0,
            expired_count: 0,
        }
    }

    /// Stores `value` under `key`, replacing any previous record.
    ///
    /// `expires_at` is absolute; the store never interprets relative
    /// durations (see [`expires_in`]). The old record's cost is retracted
    /// before the new one is added.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expires_at: Option<SystemTime>,
    ) {
        self.set_count += 1;

        let value = value.into();
        match self.entries.entry(key.into()) {
            hash_map::Entry::Occupied(mut slot) => {
                self.memory_usage -= entry_cost(slot.key(), &slot.get().value);
                self.memory_usage += entry_cost(slot.key(), &value);
                slot.insert(Entry::new(value, expires_at));
            }
            hash_map::Entry::Vacant(slot) => {
                self.memory_usage += entry_cost(slot.key(), &value);
                slot.insert(Entry::new(value, expires_at));
            }
        }
    }

    /// Gets the value for a key.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    /// An expired key is removed as a side effect.
    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.get_entry(key).map(|entry| &entry.value)
    }

    /// Gets the full record for a live key.
    pub fn get_entry(&mut self, key: &str) -> Option<&Entry> {
        self.get_count += 1;

        if !self.check_live(key, SystemTime::now()) {
            return None;
        }
        self.entries.get(key)
    }

    /// Deletes keys, live or expired.
    ///
    /// # Returns
    ///
    /// Returns the number of keys that were physically present and removed.
    pub fn delete<I, K>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut deleted = 0;
        for key in keys {
            let key = key.as_ref();
            if let Some(entry) = self.entries.remove(key) {
                self.memory_usage -= entry_cost(key, &entry.value);
                deleted += 1;
            }
        }
        self.del_count += deleted as u64;
        deleted
    }

    /// Counts how many of the given keys are live.
    ///
    /// Repeated keys are counted each time they appear.
    pub fn exists<I, K>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let now = SystemTime::now();
        keys.into_iter()
            .filter(|key| self.check_live(key.as_ref(), now))
            .count()
    }

    /// Returns all live keys matching a shell-style glob pattern.
    ///
    /// Every key in the store is checked for expiry first, so this also
    /// purges all expired entries. `"*"` skips pattern matching entirely.
    /// Order follows the underlying map and is unspecified.
    ///
    /// **Warning**: This operation scans all keys and can be slow on large stores.
    pub fn keys(&mut self, pattern: &str) -> Vec<String> {
        let now = SystemTime::now();
        let candidates: Vec<String> = self.entries.keys().cloned().collect();

        let live: Vec<String> = candidates
            .into_iter()
            .filter(|key| self.check_live(key, now))
            .collect();

        if pattern == "*" {
            return live;
        }

        let glob = GlobPattern::new(pattern);
        live.into_iter().filter(|key| glob.matches(key)).collect()
    }

    /// Clears all data and resets the memory estimate.
    pub fn flush(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.memory_usage = 0;
        debug!(keys = removed, "Store flushed");
    }

    /// Returns the type tag of a live key.
    pub fn key_type(&mut self, key: &str) -> Option<TypeTag> {
        if !self.check_live(key, SystemTime::now()) {
            return None;
        }
        self.entries.get(key).map(|entry| entry.type_tag)
    }

    /// Gets the remaining TTL for a key.
    ///
    /// # Returns
    ///
    /// - `None` if the key doesn't exist (or just expired)
    /// - `Some(None)` if the key exists but has no expiry
    /// - `Some(Some(remaining))` otherwise
    pub fn ttl(&mut self, key: &str) -> Option<Option<Duration>> {
        let now = SystemTime::now();
        if !self.check_live(key, now) {
            return None;
        }
        self.entries.get(key).map(|entry| entry.ttl_at(now))
    }

    /// Returns the current memory estimate in bytes.
    #[inline]
    pub fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    /// Returns the number of physically stored keys.
    ///
    /// This may include expired keys that no read has touched yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.entries.len(),
            memory_usage: self.memory_usage,
            get_ops: self.get_count,
            set_ops: self.set_count,
            del_ops: self.del_count,
            expired: self.expired_count,
        }
    }

    /// The single expiry check shared by every read path.
    ///
    /// Returns true if `key` is present and not expired as of `now`.
    /// An expired key is removed and its cost retracted before returning
    /// false; calling again simply finds the key absent.
    fn check_live(&mut self, key: &str, now: SystemTime) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => return false,
        };

        if expired {
            if let Some(entry) = self.entries.remove(key) {
                self.memory_usage -= entry_cost(key, &entry.value);
                self.expired_count += 1;
                trace!(key = key, "Expired key removed on access");
            }
            return false;
        }

        true
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of keys physically stored
    pub keys: usize,
    /// Current memory estimate in bytes
    pub memory_usage: usize,
    /// Total GET-style lookups
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total keys removed by DEL
    pub del_ops: u64,
    /// Total expired keys removed on access
    pub expired: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn past() -> Option<SystemTime> {
        Some(SystemTime::now() - Duration::from_secs(1))
    }

    fn future() -> Option<SystemTime> {
        expires_in(Duration::from_secs(3600))
    }

    #[test]
    fn test_set_and_get() {
        let mut store = DataStore::new();

        store.set("key", "value", None);
        assert_eq!(store.get("key"), Some(&Value::from("value")));
    }

    #[test]
    fn test_get_nonexistent() {
        let mut store = DataStore::new();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_round_trip_every_shape() {
        let mut store = DataStore::new();
        let values = vec![
            Value::from("text"),
            Value::from(42),
            Value::from(2.5),
            Value::from(true),
            Value::Nil,
            Value::list([1, 2, 3]),
            Value::set(["x", "y"]),
            Value::hash([("f", Value::list(["a"]))]),
        ];

        for (i, value) in values.iter().enumerate() {
            store.set(format!("k{}", i), value.clone(), None);
        }
        for (i, value) in values.iter().enumerate() {
            assert_eq!(store.get(&format!("k{}", i)), Some(value));
        }
    }

    #[test]
    fn test_entry_cost() {
        assert_eq!(entry_cost("key", &Value::from("value")), 3 + 5 + 64);
        assert_eq!(entry_cost("n", &Value::from(12345)), 1 + 5 + 64);
        // "[1, 2]"
        assert_eq!(entry_cost("l", &Value::list([1, 2])), 1 + 6 + 64);
        // "{'x': 1}"
        assert_eq!(entry_cost("h", &Value::hash([("x", 1)])), 1 + 8 + 64);
        // Byte length, not char count
        assert_eq!(entry_cost("é", &Value::from("ü")), 2 + 2 + 64);
    }

    #[test]
    fn test_memory_tracks_insert_and_delete() {
        let mut store = DataStore::new();
        assert_eq!(store.memory_usage(), 0);

        store.set("a", "1", None);
        store.set("b", Value::list(["x"]), None);
        let expected = entry_cost("a", &Value::from("1")) + entry_cost("b", &Value::list(["x"]));
        assert_eq!(store.memory_usage(), expected);

        assert_eq!(store.delete(["a", "b"]), 2);
        assert_eq!(store.memory_usage(), 0);
    }

    #[test]
    fn test_overwrite_replaces_record_and_cost() {
        let mut store = DataStore::new();

        store.set("k", "a much longer first value", None);
        store.set("k", Value::list([1, 2]), future());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k"), Some(&Value::list([1, 2])));
        assert_eq!(store.key_type("k"), Some(TypeTag::List));
        assert_eq!(store.memory_usage(), entry_cost("k", &Value::list([1, 2])));

        // Overwrite also replaces the expiry
        store.set("k", "plain", None);
        assert_eq!(store.ttl("k"), Some(None));
        assert_eq!(store.key_type("k"), Some(TypeTag::String));
    }

    #[test]
    fn test_overwrite_of_expired_entry() {
        let mut store = DataStore::new();

        store.set("k", "old", past());
        store.set("k", "new", None);

        assert_eq!(store.get("k"), Some(&Value::from("new")));
        assert_eq!(store.memory_usage(), entry_cost("k", &Value::from("new")));
    }

    #[test]
    fn test_delete() {
        let mut store = DataStore::new();

        store.set("key", "value", None);
        assert_eq!(store.delete(["key"]), 1);
        assert_eq!(store.get("key"), None);
        assert_eq!(store.delete(["key"]), 0); // Already deleted
    }

    #[test]
    fn test_delete_counts_only_present_keys() {
        let mut store = DataStore::new();

        store.set("k1", "v1", None);
        store.set("other", "v", None);
        let before = store.memory_usage();

        assert_eq!(store.delete(["k1", "k2"]), 1);
        assert_eq!(
            store.memory_usage(),
            before - entry_cost("k1", &Value::from("v1"))
        );
    }

    #[test]
    fn test_delete_removes_expired_entries_too() {
        let mut store = DataStore::new();

        store.set("gone", "v", past());
        assert_eq!(store.delete(["gone"]), 1);
        assert_eq!(store.memory_usage(), 0);
    }

    #[test]
    fn test_exists() {
        let mut store = DataStore::new();

        assert_eq!(store.exists(["key"]), 0);
        store.set("key", "value", None);
        store.set("other", "value", None);
        assert_eq!(store.exists(["key"]), 1);
        assert_eq!(store.exists(["key", "other", "missing"]), 2);
        assert_eq!(store.exists(["key", "key"]), 2);
    }

    #[test]
    fn test_already_expired_key_is_invisible() {
        let mut store = DataStore::new();

        store.set("k", "v", past());
        assert_eq!(store.len(), 1); // Still physically present

        assert_eq!(store.get("k"), None);
        assert_eq!(store.len(), 0);
        assert_eq!(store.memory_usage(), 0);

        assert_eq!(store.exists(["k"]), 0);
        assert_eq!(store.stats().expired, 1);
    }

    #[test]
    fn test_exists_purges_expired() {
        let mut store = DataStore::new();

        store.set("k", "v", past());
        store.set("live", "v", None);

        assert_eq!(store.exists(["k", "live"]), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.memory_usage(), entry_cost("live", &Value::from("v")));
    }

    #[test]
    fn test_expiry() {
        let mut store = DataStore::new();

        store.set("key", "value", expires_in(Duration::from_millis(50)));

        // Key should exist immediately
        assert_eq!(store.exists(["key"]), 1);

        // Wait for expiry
        std::thread::sleep(Duration::from_millis(100));

        // Key should be gone
        assert_eq!(store.get("key"), None);
        assert_eq!(store.memory_usage(), 0);
    }

    #[test]
    fn test_ttl() {
        let mut store = DataStore::new();

        // No TTL on non-existent key
        assert_eq!(store.ttl("nonexistent"), None);

        // No TTL on persistent key
        store.set("persistent", "value", None);
        assert_eq!(store.ttl("persistent"), Some(None));

        // TTL on expiring key
        store.set("expiring", "value", expires_in(Duration::from_secs(100)));
        let remaining = store.ttl("expiring").flatten().unwrap();
        assert!(remaining > Duration::from_secs(98) && remaining <= Duration::from_secs(100));

        // Expired key reads as missing
        store.set("expired", "value", past());
        assert_eq!(store.ttl("expired"), None);
    }

    #[test]
    fn test_keys_pattern() {
        let mut store = DataStore::new();

        store.set("user:1", "a", None);
        store.set("user:2", "b", None);
        store.set("order:1", "c", None);

        let users: HashSet<String> = store.keys("user:*").into_iter().collect();
        let expected: HashSet<String> = ["user:1", "user:2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(users, expected);

        assert_eq!(store.keys("*").len(), 3);
        assert_eq!(store.keys("order:?"), vec!["order:1".to_string()]);
        assert!(store.keys("nothing*").is_empty());
    }

    #[test]
    fn test_keys_purges_every_expired_entry() {
        let mut store = DataStore::new();

        store.set("user:old", "a", past());
        store.set("order:old", "b", past());
        store.set("user:new", "c", None);

        // The pattern only names users, but every expired key is purged
        assert_eq!(store.keys("user:*"), vec!["user:new".to_string()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.memory_usage(), entry_cost("user:new", &Value::from("c")));
    }

    #[test]
    fn test_flush() {
        let mut store = DataStore::new();

        store.set("key1", "value1", None);
        store.set("key2", "value2", future());

        assert_eq!(store.len(), 2);

        store.flush();

        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert!(store.keys("*").is_empty());
        assert_eq!(store.memory_usage(), 0);

        // Flushing an empty store is fine
        store.flush();
        assert_eq!(store.memory_usage(), 0);
    }

    #[test]
    fn test_type_inference() {
        let mut store = DataStore::new();

        store.set("a", 5, None);
        store.set("b", "5", None);
        store.set("c", vec![1, 2], None);
        store.set("d", Value::set([1, 2]), None);
        store.set("e", Value::hash([("x", 1)]), None);
        store.set("f", 1.5, None);

        assert_eq!(store.key_type("a"), Some(TypeTag::String));
        assert_eq!(store.key_type("b"), Some(TypeTag::String));
        assert_eq!(store.key_type("c"), Some(TypeTag::List));
        assert_eq!(store.key_type("d"), Some(TypeTag::Set));
        assert_eq!(store.key_type("e"), Some(TypeTag::Hash));
        assert_eq!(store.key_type("f"), Some(TypeTag::String));
        assert_eq!(store.key_type("missing"), None);
    }

    #[test]
    fn test_memory_monotonicity() {
        let mut store = DataStore::new();
        store.set("existing", "value", None);
        let baseline = store.memory_usage();

        let keys: Vec<String> = (0..50).map(|i| format!("key:{}", i)).collect();
        let mut expected = baseline;
        for (i, key) in keys.iter().enumerate() {
            let value = Value::list((0..i as i64).collect::<Vec<_>>());
            expected += entry_cost(key, &value);
            store.set(key.clone(), value, None);
            assert_eq!(store.memory_usage(), expected);
        }

        assert_eq!(store.delete(&keys), keys.len());
        assert_eq!(store.memory_usage(), baseline);
    }

    #[test]
    fn test_stats() {
        let mut store = DataStore::new();

        store.set("a", 1, None);
        store.set("b", 2, None);
        store.get("a");
        store.get("missing");
        store.delete(["a", "missing"]);

        let stats = store.stats();
        assert_eq!(stats.keys, 1);
        assert_eq!(stats.set_ops, 2);
        assert_eq!(stats.get_ops, 2);
        assert_eq!(stats.del_ops, 1);
        assert_eq!(stats.expired, 0);
        assert_eq!(stats.memory_usage, store.memory_usage());
    }

    #[test]
    fn test_key_type_is_not_a_get() {
        let mut store = DataStore::new();

        store.set("a", 1, None);
        store.set("gone", "v", past());
        assert_eq!(store.key_type("a"), Some(TypeTag::String));
        assert_eq!(store.key_type("gone"), None);
        assert_eq!(store.key_type("missing"), None);

        let stats = store.stats();
        assert_eq!(stats.get_ops, 0);
        assert_eq!(stats.expired, 1);
        assert_eq!(store.memory_usage(), entry_cost("a", &Value::from(1)));
    }

    #[test]
    fn test_expires_in_overflow() {
        assert!(expires_in(Duration::from_secs(60)).is_some());
        assert_eq!(expires_in(Duration::MAX), None);
        assert_eq!(expires_in(Duration::from_secs(u64::MAX)), None);
    }
}
