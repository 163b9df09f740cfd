//! # Risp - a small embeddable Lisp
//!
//! A tree-walking interpreter for a minimal Lisp dialect with exact rational
//! arithmetic, macros that receive raw syntax, closures for loaded code and a
//! file `load` mechanism with exports and namespaces.
//!
//! ## Quick Start
//!
//! ```rust
//! use risp::{Interpreter, Value};
//!
//! # fn main() -> risp::Result<()> {
//! let mut interpreter = Interpreter::new();
//! let result = interpreter.eval_source("main", r#"
//!     (defun square (x) (* x x))
//!     (def total 0)
//!     (for (list 1 2 3) (n) (def total (+ total (square n))))
//!     total
//! "#)?;
//!
//! assert_eq!(result, Value::integer(14));
//! # Ok(())
//! # }
//! ```
//!
//! ### Step by step
//!
//! The pipeline is exposed piece by piece for hosts that want to inspect
//! tokens or syntax, or evaluate against a scope they manage themselves:
//!
//! ```rust
//! use risp::runtime::Scope;
//! use risp::{eval, lex, parse, stdlib, Value};
//!
//! # fn main() -> risp::Result<()> {
//! let tokens = lex("(/ 1 3)", "main")?;
//! let nodes = parse(tokens)?;
//!
//! let scope = Scope::new(None);
//! stdlib::register_all(&scope);
//!
//! let third = eval(nodes, &scope)?;
//! assert_eq!(third.to_string(), "0.3333");
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! ### Data Types
//!
//! - **Numbers**: exact rationals; `(/ 1 3)` stays one third and prints as `0.3333`
//! - **Strings** `"text"`, **keywords** `:name`, **booleans** `t` / `f`, `nil`
//! - **Lists**: `(list 1 2 3)`; copied whenever they are read from a binding
//! - **Functions**: `(defun name (args) (body))` and `(fun (args) (body))`
//!
//! ### Scoping
//!
//! Function calls chain to the *caller's* scope, so free variables resolve
//! dynamically. Functions exported by a loaded file are pinned to that
//! file's scope instead and keep seeing its private bindings.
//!
//! ### Special Forms
//!
//! - `(def x v)`, `(defconst x v)`, `(defun ...)`, `(fun ...)`, `(defmacro ...)`
//! - `(if c then)`, `(ifel c then else)`, `(while c (body))`
//! - `(for list (item index) (body))`
//! - `(case v (candidates...) branch ... _ otherwise)`
//! - `(export name...)`, `(namespace name)`
//!
//! ## Error Handling
//!
//! Every failure carries the position it was raised at:
//!
//! ```rust
//! use risp::Interpreter;
//!
//! let mut interpreter = Interpreter::new();
//! let err = interpreter.eval_source("main", "(/ 10 0)").unwrap_err();
//! assert_eq!(err.to_string(), "runtime error: main(1:1): division by zero");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → Nodes → Block → Value
//! ```
//!
//! - [`Scanner`] - tokenizes source code
//! - [`Parser`] - builds the syntax forest
//! - [`runtime::Block`] - evaluates nodes against a [`runtime::Scope`]
//! - [`stdlib`] - builtins, special forms and the namespaced packages
//! - [`Interpreter`] - convenience facade for hosts

pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod stdlib;

/// Version of the Risp interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types
pub use error::{Error, Result};
pub use interpreter::{Interpreter, InterpreterConfig};
pub use lexer::{Position, Scanner, Token, TokenKind};
pub use parser::{Node, NodeKind, Parser};
pub use runtime::{eval, Value};

/// Tokenizes `source`, reporting positions under `name`
pub fn lex(source: &str, name: &str) -> Result<Vec<Token>> {
    Scanner::new(source, name).scan_tokens()
}

/// Parses a token stream into top-level nodes
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Node>> {
    Parser::new(tokens).parse()
}
