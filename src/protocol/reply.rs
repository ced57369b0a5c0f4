//! Shell Reply Types
//!
//! Replies are what the command handler hands back for display. They mirror
//! the value kinds of the Redis protocol, but render as text the way
//! `redis-cli` prints them instead of being serialized for the wire:
//!
//! ```text
//! Status("OK")              OK
//! Error("ERR syntax error") (error) ERR syntax error
//! Integer(2)                (integer) 2
//! Bulk("Ariz")              "Ariz"
//! Nil                       (nil)
//! Array([Bulk("a")])        1) "a"
//! Array([])                 (empty array)
//! Raw("# Server\n...")      printed verbatim
//! ```

use std::fmt::{self, Write};

/// A reply to one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Short status line such as `OK` or `PONG`
    Status(String),

    /// An error message, conventionally starting with `ERR`
    Error(String),

    /// 64-bit signed integer
    Integer(i64),

    /// A string payload, shown quoted
    Bulk(String),

    /// Missing value
    Nil,

    /// Ordered list of replies
    Array(Vec<Reply>),

    /// Multi-line text shown as is (used by `INFO`)
    Raw(String),
}

impl Reply {
    /// Creates a new status reply.
    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    /// Creates a new error reply.
    ///
    /// # Example
    /// ```
    /// use pebblekv::protocol::Reply;
    /// let err = Reply::error("ERR unknown command");
    /// assert_eq!(err.to_string(), "(error) ERR unknown command");
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    pub fn bulk(s: impl Into<String>) -> Self {
        Reply::Bulk(s.into())
    }

    pub fn nil() -> Self {
        Reply::Nil
    }

    pub fn array(values: Vec<Reply>) -> Self {
        Reply::Array(values)
    }

    /// Common reply for successful operations
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    /// Common reply for PING
    pub fn pong() -> Self {
        Reply::Status("PONG".to_string())
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Returns true if this reply is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Writes the reply; continuation lines of arrays are indented by `indent`.
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Reply::Status(s) => f.write_str(s),
            Reply::Error(s) => write!(f, "(error) {}", s),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Bulk(s) => write_quoted(f, s),
            Reply::Nil => f.write_str("(nil)"),
            Reply::Raw(s) => f.write_str(s),
            Reply::Array(items) if items.is_empty() => f.write_str("(empty array)"),
            Reply::Array(items) => {
                let width = items.len().to_string().len();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char('\n')?;
                        write!(f, "{:indent$}", "", indent = indent)?;
                    }
                    write!(f, "{:>width$}) ", i + 1, width = width)?;
                    item.fmt_indented(f, indent + width + 2)?;
                }
                Ok(())
            }
        }
    }
}

/// Quotes a bulk payload, escaping control characters like `redis-cli` does.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
