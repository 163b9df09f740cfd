//! Risp Parser Module
//!
//! Parses the token stream into a forest of S-expression syntax nodes.

mod ast;
mod sexpr_parser;

pub use ast::{Node, NodeKind};
pub use sexpr_parser::Parser;
