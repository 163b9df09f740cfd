//! Embedding facade
//!
//! Owns a root scope with the standard library registered and a top-level
//! block, so hosts can feed it source text piece by piece and keep the
//! bindings between calls.

use std::path::Path;

use crate::error::Result;
use crate::lexer::Position;
use crate::parser::Node;
use crate::runtime::{Block, Scope, Symtab, Value};
use crate::stdlib::{self, builtins};

/// What a new [`Interpreter`] starts with
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    stdlib: bool,
    prelude: Symtab,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            stdlib: cfg!(feature = "stdlib"),
            prelude: Symtab::new(),
        }
    }
}

impl InterpreterConfig {
    /// Default configuration: core builtins, plus the namespaced packages
    /// when the `stdlib` feature is enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to register the `list:`, `math:` and `strings:` packages
    pub fn with_stdlib(mut self, enabled: bool) -> Self {
        self.stdlib = enabled;
        self
    }

    /// Extra host bindings registered in the root scope, after the
    /// standard library
    pub fn with_prelude(mut self, prelude: Symtab) -> Self {
        self.prelude.extend(prelude);
        self
    }
}

/// A root scope and the top-level block evaluating against it
#[derive(Debug)]
pub struct Interpreter {
    block: Block,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with the default configuration
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// Creates an interpreter with a custom configuration
    pub fn with_config(config: InterpreterConfig) -> Self {
        let scope = Scope::new(None);
        stdlib::register_core(&scope);
        if config.stdlib {
            stdlib::register_packages(&scope);
        }
        scope.apply_symbols("", config.prelude);

        Interpreter {
            block: Block::new(Vec::new(), scope),
        }
    }

    /// The root scope
    pub fn scope(&self) -> &Scope {
        &self.block.scope
    }

    /// Namespace declared by top-level code so far, empty if none
    pub fn namespace(&self) -> &str {
        &self.block.namespace
    }

    /// Lexes, parses and evaluates `source`, returning the last result
    ///
    /// `name` is the source name positions are reported under.
    pub fn eval_source(&mut self, name: &str, source: &str) -> Result<Value> {
        let nodes = crate::parse(crate::lex(source, name)?)?;
        self.block.set_nodes(nodes);
        self.block.eval()
    }

    /// Evaluates one already parsed node at the top level
    pub fn eval_node(&mut self, node: &Node) -> Result<Value> {
        self.block.eval_node(node)
    }

    /// Reads and evaluates a file; positions are reported under the file stem
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let source = builtins::read_source(&path, &Position::new(path.as_str(), 0, 0))?;
        self.eval_source(&builtins::source_name(&path), &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Symbol;

    #[test]
    fn test_bindings_persist_between_calls() {
        let mut interpreter = Interpreter::new();
        interpreter.eval_source("a", "(def x 40)").unwrap();
        let result = interpreter.eval_source("b", "(+ x 2)").unwrap();
        assert_eq!(result, Value::integer(42));
    }

    #[test]
    fn test_without_stdlib() {
        let mut interpreter = Interpreter::with_config(InterpreterConfig::new().with_stdlib(false));
        assert!(interpreter.scope().has("+"));
        assert!(!interpreter.scope().has("list:push"));
        assert!(interpreter.eval_source("t", "(list:size (list))").is_err());
    }

    #[test]
    fn test_prelude() {
        let mut prelude = Symtab::new();
        prelude.insert("answer".into(), Symbol::constant(Value::integer(42)));
        let mut interpreter = Interpreter::with_config(InterpreterConfig::new().with_prelude(prelude));
        assert_eq!(interpreter.eval_source("t", "answer").unwrap(), Value::integer(42));
    }

    #[test]
    fn test_namespace_is_tracked() {
        let mut interpreter = Interpreter::new();
        interpreter.eval_source("t", "(namespace app)").unwrap();
        assert_eq!(interpreter.namespace(), "app");
    }

    #[test]
    fn test_missing_file() {
        let mut interpreter = Interpreter::new();
        let err = interpreter.run_file("/nonexistent/risp/file.risp").unwrap_err();
        assert!(err.message().starts_with("cannot read '/nonexistent/risp/file.risp'"));
    }
}
