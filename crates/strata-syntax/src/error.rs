//! Parse errors.

use thiserror::Error;

/// Errors produced while tokenizing or parsing a template body.
///
/// Every variant carries the 1-based line where the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unclosed `{delimiter}` tag")]
    UnclosedTag { line: usize, delimiter: &'static str },

    #[error("line {line}: unknown tag `{name}`")]
    UnknownTag { line: usize, name: String },

    #[error("line {line}: unexpected `{name}` outside of a matching construct")]
    UnexpectedTag { line: usize, name: String },

    #[error("line {line}: `{construct}` is never closed")]
    Unclosed {
        line: usize,
        construct: &'static str,
    },

    #[error("line {line}: `{tag}` requires {what}")]
    MissingArgument {
        line: usize,
        tag: &'static str,
        what: &'static str,
    },

    #[error("line {line}: invalid argument for `{tag}`: {found}")]
    InvalidArgument {
        line: usize,
        tag: &'static str,
        found: String,
    },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },
}

impl ParseError {
    /// Line the error was reported on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnclosedTag { line, .. }
            | ParseError::UnknownTag { line, .. }
            | ParseError::UnexpectedTag { line, .. }
            | ParseError::Unclosed { line, .. }
            | ParseError::MissingArgument { line, .. }
            | ParseError::InvalidArgument { line, .. }
            | ParseError::UnterminatedString { line } => *line,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
