use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Location of a token in its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Name of the source the token came from (file stem, `<stdin>`, `<repl>`)
    #[serde(skip)]
    pub source: Arc<str>,
}

impl Position {
    /// Creates a position in the named source
    pub fn new(source: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Position {
            line,
            column,
            source: source.into(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({}:{})", self.source, self.line, self.column)
    }
}

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Token text; for strings the unescaped contents, for keywords the
    /// name without the leading `:`
    pub lexeme: String,
    /// Where the token starts
    pub pos: Position,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }

    /// True for a separator token with exactly this text
    pub fn is_separator(&self, text: &str) -> bool {
        self.kind == TokenKind::Separator && self.lexeme == text
    }

    /// Nesting change caused by this token: +1 for `(`, -1 for `)`
    pub fn depth_modifier(&self) -> i32 {
        if self.is_separator("(") {
            1
        } else if self.is_separator(")") {
            -1
        } else {
            0
        }
    }
}

/// All possible token types in Risp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Decimal number literal, optionally signed, at most one `.`
    Number,
    /// Double-quoted string literal
    String,
    /// Identifier, including operator symbols like `+` and `>=`
    Identifier,
    /// `:name` keyword
    Keyword,
    /// `(` or `)`
    Separator,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Separator => "separator",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_modifier() {
        let pos = Position::new("t", 1, 1);
        assert_eq!(Token::new(TokenKind::Separator, "(", pos.clone()).depth_modifier(), 1);
        assert_eq!(Token::new(TokenKind::Separator, ")", pos.clone()).depth_modifier(), -1);
        assert_eq!(Token::new(TokenKind::Identifier, "(", pos).depth_modifier(), 0);
    }
}
