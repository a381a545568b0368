//! Error types for protocol-level parsing.
//!
//! File I/O and startup failures use `anyhow` directly (see the `bin`
//! entry points); this module only covers recoverable, expected parse
//! failures that the protocol is designed to drop and continue past.

use std::fmt;

/// A line could not be parsed as a well-formed protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub reason: &'static str,
}

impl ParseError {
    pub(crate) fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed protocol line: {}", self.reason)
    }
}

impl std::error::Error for ParseError {}
