//! # PebbleKV - An In-Memory Key-Value Store
//!
//! PebbleKV is a small in-memory key-value store with typed values, lazy
//! key expiry and a running estimate of its memory footprint. It ships with
//! a line-oriented command shell in the style of `redis-cli`.
//!
//! ## Features
//!
//! - **Typed Values**: strings, integers, lists, sets and hashes, each
//!   classified under one of four type tags
//! - **Lazy Expiry**: keys carry an optional absolute expiry time and vanish
//!   the first time a read finds them expired
//! - **Memory Accounting**: `key + textual value + 64` bytes per entry,
//!   maintained incrementally
//! - **Glob Key Listing**: `*`, `?` and `[...]` patterns
//! - **Thread Safety**: `SharedStore` serializes access behind one mutex
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          PebbleKV                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │  Session    │───>│  Tokenizer  │───>│  Command    │      │
//! │  │ (stdin/out) │    │             │    │  Handler    │      │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘      │
//! │                                               │             │
//! │                                               ▼             │
//! │                     ┌──────────────────────────────────────┐│
//! │                     │   SharedStore (Arc<Mutex<..>>)       ││
//! │                     │   ┌──────────────────────────────┐   ││
//! │                     │   │ DataStore                    │   ││
//! │                     │   │  entries + memory_usage      │   ││
//! │                     │   └──────────────────────────────┘   ││
//! │                     └──────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use pebblekv::storage::{expires_in, DataStore, TypeTag, Value};
//! use std::time::Duration;
//!
//! let mut store = DataStore::new();
//!
//! store.set("name", "Ariz", None);
//! store.set("tags", Value::set(["a", "b"]), None);
//! store.set("temp", 1, expires_in(Duration::from_secs(60)));
//!
//! assert_eq!(store.get("name"), Some(&Value::from("Ariz")));
//! assert_eq!(store.key_type("tags"), Some(TypeTag::Set));
//! assert_eq!(store.delete(["name", "missing"]), 1);
//! assert_eq!(store.exists(["tags", "temp"]), 2);
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: the data store, values, glob patterns and the shared handle
//! - [`protocol`]: shell tokenizer and reply rendering
//! - [`commands`]: command dispatch for the shell
//! - [`session`]: the async read-execute-print loop

pub mod commands;
pub mod protocol;
pub mod session;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandError, CommandHandler};
pub use protocol::{split_args, Reply, TokenizeError};
pub use session::{run_session, Session, SessionError, SessionStats};
pub use storage::{DataStore, SharedStore, TypeTag, Value};

/// Version of PebbleKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
