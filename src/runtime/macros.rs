use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::lexer::Position;
use crate::parser::{Node, NodeKind};
use crate::runtime::{Block, Value};

/// Everything a macro handler sees when it is expanded
pub struct MacroCallContext<'a> {
    /// The block the macro is used in
    pub block: &'a mut Block,
    /// Unevaluated argument nodes
    pub nodes: &'a [Node],
    /// Name the macro was called by
    pub name: &'a str,
    /// Position of the call form
    pub pos: &'a Position,
}

impl MacroCallContext<'_> {
    /// Runtime error at the call position
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::runtime(self.pos.clone(), message)
    }

    /// Identifier name of argument `index`; macros only call this after
    /// their signature has been checked
    pub fn identifier(&self, index: usize) -> Result<&str> {
        let node = self
            .nodes
            .get(index)
            .ok_or_else(|| self.error(format!("{}: missing argument {}", self.name, index + 1)))?;
        node.as_identifier()
            .ok_or_else(|| Error::runtime(node.pos().clone(), "expected an identifier"))
    }

    /// Evaluates argument `index` in the calling block
    pub fn eval(&mut self, index: usize) -> Result<Value> {
        let nodes = self.nodes;
        match nodes.get(index) {
            Some(node) => self.block.eval_node(node),
            None => Err(self.error(format!("{}: missing argument {}", self.name, index + 1))),
        }
    }
}

/// Handler invoked with the raw argument syntax
pub type MacroHandler = Rc<dyn Fn(&mut MacroCallContext<'_>) -> Result<Value>>;

/// Expected argument kinds of a macro
#[derive(Debug, Clone)]
enum Signature {
    /// Arguments are passed through unchecked
    Unchecked,
    /// Exactly these kinds, optionally followed by any number of `rest`
    Kinds {
        kinds: Vec<NodeKind>,
        rest: Option<NodeKind>,
    },
}

/// A syntax transformer: receives its arguments unevaluated
#[derive(Clone)]
pub struct Macro {
    signature: Signature,
    handler: MacroHandler,
}

impl Macro {
    /// Macro whose arguments must match `kinds` exactly
    pub fn new<F>(kinds: &[NodeKind], handler: F) -> Self
    where
        F: Fn(&mut MacroCallContext<'_>) -> Result<Value> + 'static,
    {
        Macro {
            signature: Signature::Kinds {
                kinds: kinds.to_vec(),
                rest: None,
            },
            handler: Rc::new(handler),
        }
    }

    /// Macro that validates its own arguments
    pub fn unchecked<F>(handler: F) -> Self
    where
        F: Fn(&mut MacroCallContext<'_>) -> Result<Value> + 'static,
    {
        Macro {
            signature: Signature::Unchecked,
            handler: Rc::new(handler),
        }
    }

    /// Accepts any number of trailing arguments of `kind`
    pub fn with_rest(mut self, kind: NodeKind) -> Self {
        if let Signature::Kinds { rest, .. } = &mut self.signature {
            *rest = Some(kind);
        }
        self
    }

    /// Checks argument count and kinds against the signature
    pub fn check_arguments(&self, name: &str, nodes: &[Node], pos: &Position) -> Result<()> {
        let (kinds, rest) = match &self.signature {
            Signature::Unchecked => return Ok(()),
            Signature::Kinds { kinds, rest } => (kinds, rest),
        };

        let count_ok = match rest {
            Some(_) => nodes.len() >= kinds.len(),
            None => nodes.len() == kinds.len(),
        };
        if !count_ok {
            return Err(Error::runtime(
                pos.clone(),
                format!(
                    "{}: expected {}{} arguments, got {}",
                    name,
                    if rest.is_some() { "at least " } else { "" },
                    kinds.len(),
                    nodes.len()
                ),
            ));
        }

        for (i, node) in nodes.iter().enumerate() {
            let expected = kinds.get(i).copied().or(*rest).unwrap_or(NodeKind::Any);
            if !expected.accepts(node.kind()) {
                return Err(Error::runtime(
                    node.pos().clone(),
                    format!(
                        "{}: argument {} should be of kind {}, got {}",
                        name,
                        i + 1,
                        expected,
                        node.kind()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Validates the arguments and runs the handler
    pub fn expand(
        &self,
        block: &mut Block,
        name: &str,
        nodes: &[Node],
        pos: &Position,
    ) -> Result<Value> {
        self.check_arguments(name, nodes, pos)?;
        tracing::trace!(name, args = nodes.len(), "expanding macro");

        let mut ctx = MacroCallContext {
            block,
            nodes,
            name,
            pos,
        };
        (self.handler)(&mut ctx)
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Macro")
            .field("signature", &self.signature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use crate::runtime::Scope;

    fn nodes(source: &str) -> Vec<Node> {
        let tokens = Scanner::new(source, "test").scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn count_args(ctx: &mut MacroCallContext<'_>) -> Result<Value> {
        Ok(Value::from(ctx.nodes.len()))
    }

    #[test]
    fn test_exact_signature() {
        let mac = Macro::new(&[NodeKind::Identifier, NodeKind::List], count_args);
        let pos = Position::new("test", 1, 1);
        assert!(mac.check_arguments("m", &nodes("x (a)"), &pos).is_ok());

        let err = mac.check_arguments("m", &nodes("x"), &pos).unwrap_err();
        assert_eq!(err.message(), "m: expected 2 arguments, got 1");

        let err = mac.check_arguments("m", &nodes("1 (a)"), &pos).unwrap_err();
        assert_eq!(err.message(), "m: argument 1 should be of kind identifier, got number");
    }

    #[test]
    fn test_rest_signature() {
        let mac = Macro::new(&[NodeKind::List], count_args).with_rest(NodeKind::List);
        let pos = Position::new("test", 1, 1);
        assert!(mac.check_arguments("m", &nodes("(a) (b) (c)"), &pos).is_ok());
        let err = mac.check_arguments("m", &nodes("(a) b"), &pos).unwrap_err();
        assert_eq!(err.message(), "m: argument 2 should be of kind list, got identifier");
    }

    #[test]
    fn test_unchecked_expand() {
        let mac = Macro::unchecked(count_args);
        let mut block = Block::new(Vec::new(), Scope::new(None));
        let pos = Position::new("test", 1, 1);
        let result = mac.expand(&mut block, "m", &nodes("1 2 3"), &pos).unwrap();
        assert_eq!(result, Value::integer(3));
    }
}
