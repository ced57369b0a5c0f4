//! Session Module
//!
//! Drives the interactive command shell: a loop that reads one line, runs it
//! through the [`CommandHandler`](crate::commands::CommandHandler) and prints
//! the reply.
//!
//! Each session owns its reader and writer. The store behind the handler is
//! shared, so several sessions may run against the same data.

pub mod handler;

pub use handler::{run_session, Session, SessionError, SessionStats};
