//! Lexical analysis for Risp
//!
//! Converts source text into a flat stream of tokens, tracking line, column
//! and source name for diagnostics.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::{is_identifier_part, is_identifier_start, Scanner};
pub use token::{Position, Token, TokenKind};
