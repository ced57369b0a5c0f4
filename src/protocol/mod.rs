//! Shell Protocol
//!
//! The command shell speaks a plain line protocol: one command per line in,
//! one rendered reply out. This module holds both halves.
//!
//! ## Modules
//!
//! - `tokenizer`: splits an input line into arguments
//! - `reply`: the `Reply` enum and its `redis-cli`-style rendering
//!
//! ## Example
//!
//! ```
//! use pebblekv::protocol::{split_args, Reply};
//!
//! let args = split_args(r#"SET name "Ariz K""#).unwrap();
//! assert_eq!(args, vec!["SET", "name", "Ariz K"]);
//!
//! let reply = Reply::bulk("Ariz K");
//! assert_eq!(reply.to_string(), "\"Ariz K\"");
//! ```

pub mod reply;
pub mod tokenizer;

// Re-export commonly used types for convenience
pub use reply::Reply;
pub use tokenizer::{split_args, TokenizeError};
