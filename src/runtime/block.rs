use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parser::Node;
use crate::runtime::{qualify, Quote, Scope, Value};

/// Symbol the bare-sequence form binds each intermediate result to
pub const SEQUENCE_RESULT: &str = "_";

/// A sequence of nodes evaluated against one scope
///
/// Every file, function call, loop body and macro expansion evaluates
/// through a block. The namespace set by `(namespace name)` is a property of
/// the block and determines the prefix its exports are imported under.
#[derive(Debug)]
pub struct Block {
    nodes: Rc<[Node]>,
    /// Scope the nodes are evaluated in
    pub scope: Scope,
    /// Namespace declared by the code in this block, empty if none
    pub namespace: String,
}

impl Block {
    /// Creates a block over `nodes`
    pub fn new(nodes: impl Into<Rc<[Node]>>, scope: Scope) -> Self {
        Block {
            nodes: nodes.into(),
            scope,
            namespace: String::new(),
        }
    }

    /// Replaces the nodes, keeping scope and namespace
    pub fn set_nodes(&mut self, nodes: impl Into<Rc<[Node]>>) {
        self.nodes = nodes.into();
    }

    /// The nodes this block evaluates
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Name `name` is imported under from this block's namespace
    pub fn symbol_name(&self, name: &str) -> String {
        qualify(&self.namespace, name)
    }

    /// Evaluates every node in order, returning the last result or nil
    pub fn eval(&mut self) -> Result<Value> {
        let nodes = Rc::clone(&self.nodes);
        let mut result = Value::Nil;
        for node in nodes.iter() {
            result = self.eval_node(node)?;
        }
        Ok(result)
    }

    /// Evaluates a single node in this block's scope
    pub fn eval_node(&mut self, node: &Node) -> Result<Value> {
        match node {
            Node::String { token } => Ok(Value::String(token.lexeme.clone())),
            Node::Keyword { token } => Ok(Value::Keyword(token.lexeme.clone())),
            Node::Number { token } => Value::parse_number(&token.lexeme)
                .map(Value::Number)
                .ok_or_else(|| Error::runtime(token.pos.clone(), "malformed number")),
            Node::Identifier { token } => self.scope.get(&token.lexeme).ok_or_else(|| {
                Error::runtime(
                    token.pos.clone(),
                    format!("unknown symbol '{}'", token.lexeme),
                )
            }),
            Node::Quote { node, .. } => Ok(Value::Quoted(Rc::new(Quote::new((**node).clone(), None)))),
            Node::List { nodes, .. } => self.eval_list(node, nodes),
        }
    }

    fn eval_list(&mut self, list: &Node, nodes: &[Node]) -> Result<Value> {
        let head = match nodes.first() {
            Some(head) => head,
            None => return Err(Error::runtime(list.pos().clone(), "malformed function call")),
        };

        if let Node::List { .. } = head {
            return self.eval_sequence(nodes);
        }

        let name = head
            .as_identifier()
            .ok_or_else(|| Error::runtime(head.pos().clone(), "malformed function call"))?;
        let args = &nodes[1..];

        if let Some(mac) = self.scope.get_macro(name) {
            return mac.expand(self, name, args, list.pos());
        }

        let function = match self.scope.get(name) {
            Some(Value::Function(function)) => function,
            // `(x)` with a non-function `x` reads the binding
            Some(value) if args.is_empty() => return Ok(value),
            Some(_) => {
                return Err(Error::runtime(
                    head.pos().clone(),
                    format!("'{}' is not a function", name),
                ))
            }
            None => {
                return Err(Error::runtime(
                    head.pos().clone(),
                    format!("unknown function '{}'", name),
                ))
            }
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_node(arg)?);
        }
        function.call(self, values, list.pos())
    }

    /// `((a) (b) ...)`: runs each child in order, exposing the previous
    /// result as `_`; a `_` this frame already bound is restored afterwards
    fn eval_sequence(&mut self, nodes: &[Node]) -> Result<Value> {
        let previous = self.scope.get_local(SEQUENCE_RESULT);
        let mut result = Ok(Value::Nil);
        for node in nodes {
            result = self.eval_node(node);
            match &result {
                Ok(value) => self.scope.set_local(SEQUENCE_RESULT, value.clone()),
                Err(_) => break,
            }
        }
        match previous {
            Some(symbol) => self.scope.set_symbol_local(SEQUENCE_RESULT, symbol),
            None => {
                self.scope.remove_local(SEQUENCE_RESULT);
            }
        }
        result
    }
}

/// Evaluates `nodes` against `scope`, returning the last result
pub fn eval(nodes: impl Into<Rc<[Node]>>, scope: &Scope) -> Result<Value> {
    Block::new(nodes, scope.clone()).eval()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use crate::runtime::{CallContext, Function, Symbol, ValueType};

    fn add(ctx: &mut CallContext<'_>) -> Result<Value> {
        ctx.validate(&[ValueType::Number, ValueType::Number])?;
        Ok(Value::Number(ctx.number(0)? + ctx.number(1)?))
    }

    fn run(source: &str, scope: &Scope) -> Result<Value> {
        let tokens = Scanner::new(source, "test").scan_tokens()?;
        let nodes = Parser::new(tokens).parse()?;
        eval(nodes, scope)
    }

    fn scope() -> Scope {
        let scope = Scope::new(None);
        scope.set_symbol_local("+", Symbol::new(Value::Function(Rc::new(Function::builtin("+", add)))));
        scope
    }

    #[test]
    fn test_literals() {
        let scope = scope();
        assert_eq!(run("42", &scope).unwrap(), Value::integer(42));
        assert_eq!(run("\"hi\"", &scope).unwrap(), Value::from("hi"));
        assert_eq!(run(":k", &scope).unwrap(), Value::Keyword("k".into()));
        assert_eq!(run("", &scope).unwrap(), Value::Nil);
    }

    #[test]
    fn test_call_builtin() {
        let scope = scope();
        assert_eq!(run("(+ 1 (+ 2 3))", &scope).unwrap(), Value::integer(6));
    }

    #[test]
    fn test_unknown_symbol() {
        let err = run("missing", &scope()).unwrap_err();
        assert_eq!(err.message(), "unknown symbol 'missing'");
        let err = run("(missing 1)", &scope()).unwrap_err();
        assert_eq!(err.message(), "unknown function 'missing'");
    }

    #[test]
    fn test_empty_list_is_malformed() {
        let err = run("()", &scope()).unwrap_err();
        assert_eq!(err.message(), "malformed function call");
    }

    #[test]
    fn test_parenthesised_read() {
        let scope = scope();
        scope.set_local("x", Value::integer(9));
        assert_eq!(run("(x)", &scope).unwrap(), Value::integer(9));
        let err = run("(x 1)", &scope).unwrap_err();
        assert_eq!(err.message(), "'x' is not a function");
    }

    #[test]
    fn test_sequence_binds_previous_result() {
        let scope = scope();
        assert_eq!(run("((+ 1 2) (+ _ 10))", &scope).unwrap(), Value::integer(13));
        assert!(!scope.has("_"));
    }

    #[test]
    fn test_sequence_cleans_up_on_error() {
        let scope = scope();
        assert!(run("((+ 1 2) (missing))", &scope).is_err());
        assert!(!scope.has("_"));
    }

    #[test]
    fn test_sequence_restores_outer_result() {
        let scope = scope();
        scope.set_local("_", Value::integer(5));
        assert_eq!(run("((+ 1 2) (+ _ 1))", &scope).unwrap(), Value::integer(4));
        assert_eq!(scope.get("_"), Some(Value::integer(5)));
    }

    #[test]
    fn test_symbol_name_uses_namespace() {
        let mut block = Block::new(Vec::new(), Scope::new(None));
        assert_eq!(block.symbol_name("f"), "f");
        block.namespace = "geo".into();
        assert_eq!(block.symbol_name("f"), "geo:f");
    }
}
