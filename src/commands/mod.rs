//! Command Handler Module
//!
//! This module implements the command processing layer for PebbleKV.
//! It receives tokenized shell lines, executes them against the data store,
//! and returns replies for display.
//!
//! ## Architecture
//!
//! ```text
//! Shell Line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Tokenizer      │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  SharedStore    │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `SET`, `GET`, `DEL`, `EXISTS`, `KEYS`, `TYPE`, `TTL`, `PTTL`
//! - `PING`, `ECHO`, `DBSIZE`, `FLUSHDB`, `FLUSHALL`, `INFO`, `QUIT`

pub mod handler;

// Re-export the main command handler
pub use handler::{is_quit, parse_value, CommandError, CommandHandler};
