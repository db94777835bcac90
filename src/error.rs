use std::fmt;

use thiserror::Error;

/// A fatal syntax error. Carries the position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> ParseError {
        ParseError {
            message: message.into(),
            line,
            column,
        }
    }
}

/// The pipeline stage a translation failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Parse => "parse",
            Phase::Semantic => "semantic",
        })
    }
}

/// Failure of a whole `translate` call. For the semantic phase `message`
/// carries the full newline-joined error list, not just the first error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase} error: {message}")]
pub struct TranslateError {
    pub phase: Phase,
    pub message: String,
}
