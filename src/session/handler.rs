//! Session Handler Module
//!
//! This module runs one interactive shell session: it reads lines, executes
//! them as commands, and writes back rendered replies.
//!
//! ## Session Lifecycle
//!
//! ```text
//! 1. Session created over a reader/writer pair
//!        │
//!        ▼
//! 2. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  Write prompt (optional)     │
//!    │  Read one line               │
//!    │  Tokenize                    │
//!    │  Execute command             │
//!    │  Write reply                 │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 3. EOF or QUIT → session ends, stats returned
//! ```
//!
//! The session is generic over `AsyncBufRead`/`AsyncWrite`, so the binary
//! drives it with stdin/stdout and tests drive it with in-memory buffers.

use crate::commands::{is_quit, CommandHandler};
use crate::protocol::{split_args, Reply};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace, warn};

/// Counters for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Lines executed as commands (blank lines excluded)
    pub commands_processed: u64,
    /// Replies that were errors, including tokenize failures
    pub errors: u64,
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One shell session.
pub struct Session<R, W> {
    /// Line source
    reader: R,

    /// Reply sink
    writer: W,

    /// The command handler (shares the store)
    command_handler: CommandHandler,

    /// Written before each line is read
    prompt: Option<String>,

    stats: SessionStats,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new session without a prompt.
    pub fn new(reader: R, writer: W, command_handler: CommandHandler) -> Self {
        Self {
            reader,
            writer,
            command_handler,
            prompt: None,
            stats: SessionStats::default(),
        }
    }

    /// Sets the prompt shown before each command.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Runs the session until EOF or `QUIT`.
    pub async fn run(mut self) -> Result<SessionStats, SessionError> {
        info!("Session started");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(
                commands = self.stats.commands_processed,
                errors = self.stats.errors,
                "Session ended"
            ),
            Err(e) => warn!(error = %e, "Session error"),
        }

        result.map(|()| self.stats)
    }

    /// The main read-execute-reply loop.
    async fn main_loop(&mut self) -> Result<(), SessionError> {
        let mut line = String::new();

        loop {
            self.write_prompt().await?;

            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                debug!("End of input");
                return Ok(());
            }

            let args = match split_args(line.trim_end_matches(['\r', '\n'])) {
                Ok(args) => args,
                Err(e) => {
                    self.stats.errors += 1;
                    self.send_reply(&Reply::error(format!("ERR {}", e))).await?;
                    continue;
                }
            };

            if args.is_empty() {
                continue;
            }

            let reply = self.command_handler.execute(&args);
            self.stats.commands_processed += 1;
            if reply.is_error() {
                self.stats.errors += 1;
            }

            self.send_reply(&reply).await?;

            if is_quit(&args) {
                debug!("Client sent QUIT");
                return Ok(());
            }
        }
    }

    async fn write_prompt(&mut self) -> Result<(), SessionError> {
        if let Some(prompt) = &self.prompt {
            self.writer.write_all(prompt.as_bytes()).await?;
            self.writer.flush().await?;
        }
        Ok(())
    }

    /// Writes one reply followed by a newline.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), SessionError> {
        let mut out = reply.to_string();
        out.push('\n');
        self.writer.write_all(out.as_bytes()).await?;
        self.writer.flush().await?;
        trace!(bytes = out.len(), "Sent reply");
        Ok(())
    }
}

/// Runs a prompt-less session to completion.
///
/// This is a convenience function for scripted input.
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    command_handler: CommandHandler,
) -> Result<SessionStats, SessionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    Session::new(reader, writer, command_handler).run().await
}
