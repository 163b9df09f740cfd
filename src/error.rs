//! Error types for the Risp interpreter

use thiserror::Error;

use crate::lexer::Position;

/// Risp interpreter errors
///
/// Both kinds carry the source position they were raised at. Errors are
/// never caught inside the language: any failure aborts the current
/// top-level unit and is handed back to the host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Lexer or parser failure
    ///
    /// **Triggered by:** malformed numbers, unterminated strings, unknown
    /// characters, unclosed lists, stray closing parentheses
    /// **Example:** `(+ 1 2` (missing closing parenthesis)
    #[error("syntax error: {pos}: {message}")]
    SyntaxError {
        /// Where the error was detected
        pos: Position,
        /// Error description
        message: String,
    },

    /// Evaluation failure
    ///
    /// **Triggered by:** unknown symbols, wrong arity or argument types,
    /// division by zero, out-of-bounds access, reassigning a constant
    /// **Example:** `(/ 1 0)`
    #[error("runtime error: {pos}: {message}")]
    RuntimeError {
        /// Where the error was detected
        pos: Position,
        /// Error description
        message: String,
    },
}

impl Error {
    /// Create a syntax error at the given position
    pub fn syntax(pos: Position, msg: impl Into<String>) -> Self {
        Error::SyntaxError {
            pos,
            message: msg.into(),
        }
    }

    /// Create a runtime error at the given position
    pub fn runtime(pos: Position, msg: impl Into<String>) -> Self {
        Error::RuntimeError {
            pos,
            message: msg.into(),
        }
    }

    /// Position the error was raised at
    pub fn position(&self) -> &Position {
        match self {
            Error::SyntaxError { pos, .. } | Error::RuntimeError { pos, .. } => pos,
        }
    }

    /// Bare error message, without kind or position
    pub fn message(&self) -> &str {
        match self {
            Error::SyntaxError { message, .. } | Error::RuntimeError { message, .. } => message,
        }
    }

    /// True for lexer/parser errors
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::SyntaxError { .. })
    }
}

/// Result type for Risp operations
pub type Result<T> = std::result::Result<T, Error>;
