//! Storage Module
//!
//! This module provides the core storage functionality for PebbleKV:
//! a typed key-value map with lazy expiry and an incrementally maintained
//! memory estimate.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SharedStore                             │
//! │               Arc<Mutex<DataStore>>                         │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │                    DataStore                          │  │
//! │  │   HashMap<String, Entry>        memory_usage: usize   │  │
//! │  │   Entry { value, type_tag, expires_at }               │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Typed Values**: strings, integers, lists, sets and hashes
//! - **Type Tags**: every value classifies as `string`, `list`, `set` or `hash`
//! - **Lazy Expiry**: expired keys are removed when a read touches them
//! - **Memory Accounting**: O(1) estimate of stored bytes, updated on every mutation
//! - **Glob Matching**: `KEYS`-style shell patterns
//!
//! ## Example
//!
//! ```
//! use pebblekv::storage::{expires_in, DataStore, Value};
//! use std::time::Duration;
//!
//! let mut store = DataStore::new();
//!
//! store.set("user:1", "Ariz", None);
//! store.set("user:2", Value::hash([("name", "Sam")]), None);
//! store.set("session", "token123", expires_in(Duration::from_secs(3600)));
//!
//! let mut users = store.keys("user:*");
//! users.sort();
//! assert_eq!(users, vec!["user:1", "user:2"]);
//! assert!(store.memory_usage() > 0);
//! ```

pub mod engine;
pub mod glob;
pub mod shared;
pub mod value;

// Re-export commonly used types
pub use engine::{entry_cost, expires_in, DataStore, Entry, StoreStats, ENTRY_OVERHEAD};
pub use glob::GlobPattern;
pub use shared::SharedStore;
pub use value::{TypeTag, Value};
