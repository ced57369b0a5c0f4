//! Command Handler Module
//!
//! This module implements the shell commands for PebbleKV.
//! It takes tokenized lines and dispatches them to the data store.
//!
//! ## Supported Commands
//!
//! ### Data Commands
//! - `SET key value [EX seconds | PX milliseconds | EXAT timestamp | PXAT ms-timestamp] [NX|XX]`
//! - `GET key` - Get a key's value
//! - `DEL key [key ...]` - Delete keys
//! - `EXISTS key [key ...]` - Count live keys
//! - `KEYS [pattern]` - Find keys by glob pattern (default `*`)
//! - `TYPE key` - Get key type ("string", "list", "set", "hash" or "none")
//! - `TTL key` / `PTTL key` - Remaining time to live
//!
//! ### Server Commands
//! - `PING [message]`, `ECHO message`
//! - `DBSIZE`, `FLUSHDB` / `FLUSHALL`
//! - `INFO` - Memory estimate and operation counters
//! - `QUIT` - End the session
//!
//! Expiry options are converted to absolute timestamps here; the store only
//! ever sees absolute times.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  execute()  │───>│  dispatch() │───>│  cmd_*()    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                        SharedStore          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::protocol::Reply;
use crate::storage::{expires_in, SharedStore, Value};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors a command can fail with. Each becomes an error reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR empty command")]
    EmptyCommand,

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),

    #[error("ERR syntax error")]
    Syntax,

    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(&'static str),
}

type CommandResult = Result<Reply, CommandError>;

/// Returns true if `args` is a `QUIT` command.
pub fn is_quit(args: &[String]) -> bool {
    args.first()
        .map(|name| name.eq_ignore_ascii_case("QUIT"))
        .unwrap_or(false)
}

/// Converts a shell argument into a stored value.
///
/// Canonical decimal integers become `Int`; everything else stays text.
/// `"007"` stays a string so that `GET` hands back exactly what was set.
pub fn parse_value(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) if n.to_string() == raw => Value::Int(n),
        _ => Value::Str(raw.to_string()),
    }
}

/// Handles shell commands by dispatching them to the data store.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The data store
    store: SharedStore,
    /// Start time for INFO
    start_time: Instant,
}

impl CommandHandler {
    /// Creates a new command handler over the given store.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }

    /// The store this handler operates on.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Executes a tokenized command and returns the reply.
    ///
    /// Failures come back as [`Reply::Error`]; this never panics on bad input.
    pub fn execute(&self, args: &[String]) -> Reply {
        match self.try_execute(args) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, "Command failed");
                Reply::error(e.to_string())
            }
        }
    }

    fn try_execute(&self, args: &[String]) -> CommandResult {
        let (name, rest) = args.split_first().ok_or(CommandError::EmptyCommand)?;
        let cmd = name.to_uppercase();
        debug!(command = %cmd, argc = rest.len(), "Executing command");
        self.dispatch(&cmd, rest)
    }

    /// Dispatches a command to its handler.
    fn dispatch(&self, cmd: &str, args: &[String]) -> CommandResult {
        match cmd {
            // Data commands
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),
            "EXISTS" => self.cmd_exists(args),
            "KEYS" => self.cmd_keys(args),
            "TYPE" => self.cmd_type(args),
            "TTL" => self.cmd_ttl(args, "ttl", |d| ((d.as_millis() + 500) / 1000) as i64),
            "PTTL" => self.cmd_ttl(args, "pttl", |d| d.as_millis() as i64),

            // Server commands
            "PING" => self.cmd_ping(args),
            "ECHO" => self.cmd_echo(args),
            "DBSIZE" => self.cmd_dbsize(args),
            "FLUSHDB" | "FLUSHALL" => self.cmd_flush(args),
            "INFO" => self.cmd_info(args),
            "QUIT" => Ok(Reply::ok()),

            _ => Err(CommandError::UnknownCommand(cmd.to_string())),
        }
    }

    // ========================================================================
    // Data Commands
    // ========================================================================

    /// SET key value [EX s | PX ms | EXAT ts | PXAT ms-ts] [NX|XX]
    fn cmd_set(&self, args: &[String]) -> CommandResult {
        if args.len() < 2 {
            return Err(CommandError::WrongArity("set"));
        }

        let key = &args[0];
        let value = parse_value(&args[1]);

        let mut expires_at: Option<SystemTime> = None;
        let mut nx = false; // Only set if not exists
        let mut xx = false; // Only set if exists

        let mut options = args[2..].iter();
        while let Some(opt) = options.next() {
            let opt = opt.to_uppercase();
            match opt.as_str() {
                "EX" | "PX" | "EXAT" | "PXAT" => {
                    if expires_at.is_some() {
                        return Err(CommandError::Syntax);
                    }
                    let raw = options.next().ok_or(CommandError::Syntax)?;
                    expires_at = Some(parse_expiry(&opt, raw)?);
                }
                "NX" if !xx => nx = true,
                "XX" if !nx => xx = true,
                _ => return Err(CommandError::Syntax),
            }
        }

        // Check and write under one lock so NX/XX cannot race
        let mut store = self.store.lock();
        if nx || xx {
            let exists = store.exists([key]) > 0;
            if (nx && exists) || (xx && !exists) {
                return Ok(Reply::nil());
            }
        }
        store.set(key.clone(), value, expires_at);

        Ok(Reply::ok())
    }

    /// GET key
    fn cmd_get(&self, args: &[String]) -> CommandResult {
        let [key] = args else {
            return Err(CommandError::WrongArity("get"));
        };

        Ok(match self.store.get(key) {
            Some(value) => Reply::bulk(value.to_string()),
            None => Reply::nil(),
        })
    }

    /// DEL key [key ...]
    fn cmd_del(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::WrongArity("del"));
        }
        Ok(Reply::integer(self.store.delete(args) as i64))
    }

    /// EXISTS key [key ...]
    fn cmd_exists(&self, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::WrongArity("exists"));
        }
        Ok(Reply::integer(self.store.exists(args) as i64))
    }

    /// KEYS [pattern]
    fn cmd_keys(&self, args: &[String]) -> CommandResult {
        let pattern = match args {
            [] => "*",
            [pattern] => pattern.as_str(),
            _ => return Err(CommandError::WrongArity("keys")),
        };

        let mut keys = self.store.keys(pattern);
        // Map order is arbitrary; sort for readable output
        keys.sort_unstable();

        Ok(Reply::array(keys.into_iter().map(Reply::Bulk).collect()))
    }

    /// TYPE key
    fn cmd_type(&self, args: &[String]) -> CommandResult {
        let [key] = args else {
            return Err(CommandError::WrongArity("type"));
        };

        Ok(match self.store.key_type(key) {
            Some(tag) => Reply::status(tag.as_str()),
            None => Reply::status("none"),
        })
    }

    /// TTL key / PTTL key
    ///
    /// -2 if the key is missing, -1 if it never expires.
    fn cmd_ttl(
        &self,
        args: &[String],
        name: &'static str,
        unit: impl Fn(Duration) -> i64,
    ) -> CommandResult {
        let [key] = args else {
            return Err(CommandError::WrongArity(name));
        };

        Ok(Reply::integer(match self.store.ttl(key) {
            None => -2,
            Some(None) => -1,
            Some(Some(remaining)) => unit(remaining),
        }))
    }

    // ========================================================================
    // Server Commands
    // ========================================================================

    /// PING [message]
    fn cmd_ping(&self, args: &[String]) -> CommandResult {
        match args {
            [] => Ok(Reply::pong()),
            [message] => Ok(Reply::bulk(message.clone())),
            _ => Err(CommandError::WrongArity("ping")),
        }
    }

    /// ECHO message
    fn cmd_echo(&self, args: &[String]) -> CommandResult {
        match args {
            [message] => Ok(Reply::bulk(message.clone())),
            _ => Err(CommandError::WrongArity("echo")),
        }
    }

    /// DBSIZE
    fn cmd_dbsize(&self, args: &[String]) -> CommandResult {
        if !args.is_empty() {
            return Err(CommandError::WrongArity("dbsize"));
        }
        Ok(Reply::integer(self.store.len() as i64))
    }

    /// FLUSHDB / FLUSHALL
    fn cmd_flush(&self, args: &[String]) -> CommandResult {
        if !args.is_empty() {
            return Err(CommandError::Syntax);
        }
        self.store.flush();
        Ok(Reply::ok())
    }

    /// INFO
    fn cmd_info(&self, _args: &[String]) -> CommandResult {
        let stats = self.store.stats();
        let uptime = self.start_time.elapsed().as_secs();

        let info = format!(
            "# Server\n\
             pebblekv_version:{}\n\
             os:{}\n\
             uptime_in_seconds:{}\n\
             \n\
             # Memory\n\
             used_memory:{}\n\
             used_memory_human:{:.2}K\n\
             \n\
             # Keyspace\n\
             keys:{}\n\
             \n\
             # Operations\n\
             get_ops:{}\n\
             set_ops:{}\n\
             del_ops:{}\n\
             expired_keys:{}",
            crate::VERSION,
            std::env::consts::OS,
            uptime,
            stats.memory_usage,
            stats.memory_usage as f64 / 1024.0,
            stats.keys,
            stats.get_ops,
            stats.set_ops,
            stats.del_ops,
            stats.expired,
        );

        Ok(Reply::Raw(info))
    }
}

/// Turns an expiry option and its argument into an absolute time.
///
/// Times that `SystemTime` cannot represent are rejected, never wrapped.
fn parse_expiry(opt: &str, raw: &str) -> Result<SystemTime, CommandError> {
    let invalid = CommandError::InvalidExpireTime("set");

    let expires_at = match opt {
        "EX" | "PX" | "PXAT" => {
            let n: u64 = raw.parse().map_err(|_| CommandError::NotAnInteger)?;
            if n == 0 {
                return Err(invalid);
            }
            match opt {
                "EX" => expires_in(Duration::from_secs(n)),
                "PX" => expires_in(Duration::from_millis(n)),
                _ => UNIX_EPOCH.checked_add(Duration::from_millis(n)),
            }
        }
        // EXAT takes seconds since the epoch, fractions allowed
        _ => {
            let secs: f64 = raw.parse().map_err(|_| CommandError::NotAnInteger)?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(invalid);
            }
            Duration::try_from_secs_f64(secs)
                .ok()
                .and_then(|d| UNIX_EPOCH.checked_add(d))
        }
    };

    expires_at.ok_or(invalid)
}
