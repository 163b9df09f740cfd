use serde::Serialize;
use std::fmt;

use crate::lexer::{Position, Token};

/// Syntax node produced by the parser
///
/// Nodes are immutable once parsed. Function and macro bodies keep the
/// nodes they were defined with and walk them again on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// String literal
    String {
        /// The literal token, already unescaped
        token: Token,
    },
    /// Number literal
    Number {
        /// The literal token
        token: Token,
    },
    /// Identifier (symbol reference or call head)
    Identifier {
        /// The identifier token
        token: Token,
    },
    /// `:keyword` literal
    Keyword {
        /// The keyword token, without the colon
        token: Token,
    },
    /// Parenthesised list of nodes
    List {
        /// The `(` token
        open: Token,
        /// The matching `)` token
        close: Token,
        /// Children in source order
        nodes: Vec<Node>,
    },
    /// Deferred syntax, evaluates to a quoted value instead of running
    Quote {
        /// Token the quote was introduced at
        token: Token,
        /// The wrapped node
        node: Box<Node>,
    },
}

/// Syntactic category of a node, used to validate macro arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// String literal
    String,
    /// Number literal
    Number,
    /// Identifier
    Identifier,
    /// Keyword literal
    Keyword,
    /// List
    List,
    /// Quote
    Quote,
    /// Accepts any node
    Any,
}

impl NodeKind {
    /// True if a node of kind `actual` satisfies this expectation
    pub fn accepts(self, actual: NodeKind) -> bool {
        self == NodeKind::Any || self == actual
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Identifier => "identifier",
            NodeKind::Keyword => "keyword",
            NodeKind::List => "list",
            NodeKind::Quote => "quote",
            NodeKind::Any => "any",
        };
        write!(f, "{}", name)
    }
}

impl Node {
    /// Syntactic category of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::String { .. } => NodeKind::String,
            Node::Number { .. } => NodeKind::Number,
            Node::Identifier { .. } => NodeKind::Identifier,
            Node::Keyword { .. } => NodeKind::Keyword,
            Node::List { .. } => NodeKind::List,
            Node::Quote { .. } => NodeKind::Quote,
        }
    }

    /// Source position of the node (the opening token for lists)
    pub fn pos(&self) -> &Position {
        match self {
            Node::String { token }
            | Node::Number { token }
            | Node::Identifier { token }
            | Node::Keyword { token }
            | Node::Quote { token, .. } => &token.pos,
            Node::List { open, .. } => &open.pos,
        }
    }

    /// Identifier name, if this node is an identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Node::Identifier { token } => Some(&token.lexeme),
            _ => None,
        }
    }

    /// Children, if this node is a list
    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List { nodes, .. } => Some(nodes),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::String { token } | Node::Number { token } | Node::Identifier { token } => {
                write!(f, "{}", token.lexeme)
            }
            Node::Keyword { token } => write!(f, ":{}", token.lexeme),
            Node::List { nodes, .. } => {
                write!(f, "(")?;
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", node)?;
                }
                write!(f, ")")
            }
            Node::Quote { node, .. } => write!(f, "{}", node),
        }
    }
}
