//! Inline Command Tokenizer
//!
//! Splits one line of shell input into arguments, following the same rules
//! as `redis-cli`:
//!
//! - arguments are separated by whitespace
//! - `"double quoted"` arguments understand `\n \r \t \\ \"` escapes
//! - `'single quoted'` arguments are literal, except `\'`
//! - a closing quote must be followed by whitespace or the end of the line
//!
//! ```text
//! SET greeting "hello world"   →  ["SET", "greeting", "hello world"]
//! SET note 'it''s'             →  error: closing quote must be followed by a space
//! ```

use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Errors that can occur while splitting a line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// A quoted argument was never closed
    #[error("unbalanced quotes in request")]
    UnbalancedQuotes,

    /// Text directly follows a closing quote
    #[error("closing quote must be followed by a space")]
    TrailingAfterQuote,
}

/// Splits `line` into arguments. An empty or blank line yields no arguments.
pub fn split_args(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut args = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let arg = match chars.peek() {
            None => break,
            Some('"') => {
                chars.next();
                read_double_quoted(&mut chars)?
            }
            Some('\'') => {
                chars.next();
                read_single_quoted(&mut chars)?
            }
            Some(_) => read_bare(&mut chars),
        };
        args.push(arg);
    }

    Ok(args)
}

fn read_bare(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut arg = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
        arg.push(c);
    }
    arg
}

fn read_double_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String, TokenizeError> {
    let mut arg = String::new();
    loop {
        match chars.next() {
            None => return Err(TokenizeError::UnbalancedQuotes),
            Some('\\') => match chars.next() {
                None => return Err(TokenizeError::UnbalancedQuotes),
                Some('n') => arg.push('\n'),
                Some('r') => arg.push('\r'),
                Some('t') => arg.push('\t'),
                Some(c) => arg.push(c),
            },
            Some('"') => {
                expect_separator(chars)?;
                return Ok(arg);
            }
            Some(c) => arg.push(c),
        }
    }
}

fn read_single_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String, TokenizeError> {
    let mut arg = String::new();
    loop {
        match chars.next() {
            None => return Err(TokenizeError::UnbalancedQuotes),
            Some('\\') if chars.peek() == Some(&'\'') => {
                chars.next();
                arg.push('\'');
            }
            Some('\'') => {
                expect_separator(chars)?;
                return Ok(arg);
            }
            Some(c) => arg.push(c),
        }
    }
}

fn expect_separator(chars: &mut Peekable<Chars<'_>>) -> Result<(), TokenizeError> {
    match chars.peek() {
        None => Ok(()),
        Some(c) if c.is_whitespace() => Ok(()),
        Some(_) => Err(TokenizeError::TrailingAfterQuote),
    }
}
