use super::ast::Node;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// S-expression parser for Risp
///
/// Single left-to-right pass without backtracking. The parser has no
/// semantic knowledge: special forms are ordinary lists here.
pub struct Parser {
    tokens: Vec<Token>,
}

impl Parser {
    /// Creates a new parser over a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens }
    }

    /// Parses the tokens into a forest of syntax nodes
    pub fn parse(&self) -> Result<Vec<Node>> {
        parse_tokens(&self.tokens)
    }
}

fn parse_tokens(tokens: &[Token]) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut current = 0;

    while current < tokens.len() {
        let (node, consumed) = next_node(&tokens[current..])?;
        nodes.push(node);
        current += consumed;
    }

    Ok(nodes)
}

/// Parses the node starting at `tokens[0]`, returning it with the number of
/// tokens it spans
fn next_node(tokens: &[Token]) -> Result<(Node, usize)> {
    let token = &tokens[0];

    let node = match token.kind {
        TokenKind::Identifier => Node::Identifier {
            token: token.clone(),
        },
        TokenKind::Keyword => Node::Keyword {
            token: token.clone(),
        },
        TokenKind::Number => Node::Number {
            token: token.clone(),
        },
        TokenKind::String => Node::String {
            token: token.clone(),
        },
        TokenKind::Separator if token.is_separator("(") => return parse_list(tokens),
        TokenKind::Separator => {
            return Err(Error::syntax(
                token.pos.clone(),
                format!("unexpected token '{}'", token.lexeme),
            ))
        }
    };

    Ok((node, 1))
}

fn parse_list(tokens: &[Token]) -> Result<(Node, usize)> {
    let mut depth = 1;

    for (offset, token) in tokens.iter().enumerate().skip(1) {
        depth += token.depth_modifier();

        if depth == 0 {
            // The slice between the delimiters is parsed independently
            let nodes = parse_tokens(&tokens[1..offset])?;
            let node = Node::List {
                open: tokens[0].clone(),
                close: token.clone(),
                nodes,
            };
            return Ok((node, offset + 1));
        }
    }

    let last = tokens.last().unwrap_or(&tokens[0]);
    Err(Error::syntax(last.pos.clone(), "unclosed list"))
}
