use std::sync::Arc;

use super::token::{Position, Token, TokenKind};
use crate::error::{Error, Result};

/// Scanner turning Risp source text into a flat token stream
pub struct Scanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Name used in positions of produced tokens
    name: Arc<str>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line and column where the current token starts
    start_line: usize,
    start_column: usize,
}

impl Scanner {
    /// Creates a new scanner over `source`; `name` identifies it in diagnostics
    pub fn new(source: &str, name: impl Into<Arc<str>>) -> Self {
        Scanner {
            source: source.chars().collect(),
            name: name.into(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.peek();

        match c {
            c if c.is_ascii_digit() => self.scan_number(),
            '+' | '-' if self.peek_next().is_ascii_digit() => self.scan_number(),

            // Two-character comparison operators
            '>' | '<' | '!' if self.peek_next() == '=' => {
                self.advance();
                self.advance();
                self.add_token(TokenKind::Identifier);
                Ok(())
            }

            // Single-character operators are plain identifiers
            '_' | '+' | '-' | '*' | '/' | '%' | '=' | '>' | '<' => {
                self.advance();
                self.add_token(TokenKind::Identifier);
                Ok(())
            }

            ':' if is_identifier_start(self.peek_next()) => {
                self.advance();
                self.start = self.current;
                self.scan_identifier(TokenKind::Keyword);
                Ok(())
            }

            c if is_identifier_start(c) => {
                self.scan_identifier(TokenKind::Identifier);
                Ok(())
            }

            '"' => self.scan_string(),

            '(' | ')' => {
                self.advance();
                self.add_token(TokenKind::Separator);
                Ok(())
            }

            c if c.is_control() || c.is_whitespace() => {
                self.advance();
                Ok(())
            }

            _ => Err(Error::syntax(
                self.current_position(),
                format!("unknown character '{}'", c),
            )),
        }
    }

    fn scan_number(&mut self) -> Result<()> {
        if matches!(self.peek(), '+' | '-') {
            self.advance();
        }

        let mut seen_dot = false;
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();

            if !self.is_at_end() && self.peek() == '.' {
                if seen_dot {
                    return Err(Error::syntax(self.current_position(), "malformed number"));
                }
                seen_dot = true;
                self.advance();
            }
        }

        self.add_token(TokenKind::Number);
        Ok(())
    }

    fn scan_string(&mut self) -> Result<()> {
        self.advance(); // Opening "

        let mut value = String::new();
        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c != '\\' {
                value.push(c);
                continue;
            }

            if self.is_at_end() {
                break;
            }
            let escaped = self.advance();
            match escaped {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                '\\' => value.push('\\'),
                '"' => value.push('"'),
                '\'' => value.push('\''),
                _ => {
                    return Err(Error::syntax(
                        self.current_position(),
                        format!("invalid escape sequence '\\{}'", escaped),
                    ));
                }
            }
        }

        if self.is_at_end() {
            return Err(Error::syntax(
                self.current_position(),
                "unclosed string literal",
            ));
        }

        self.advance(); // Closing "

        self.tokens
            .push(Token::new(TokenKind::String, value, self.start_position()));
        Ok(())
    }

    fn scan_identifier(&mut self, kind: TokenKind) {
        self.advance();
        while !self.is_at_end() && is_identifier_part(self.peek()) {
            self.advance();
        }
        self.add_token(kind);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn current_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            source: self.name.clone(),
        }
    }

    fn start_position(&self) -> Position {
        Position {
            line: self.start_line,
            column: self.start_column,
            source: self.name.clone(),
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens
            .push(Token::new(kind, lexeme, self.start_position()));
    }
}

/// Characters that may start an identifier or keyword
pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic()
}

/// Characters allowed after the first character of an identifier
pub fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_numeric() || c == '-' || c == ':'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Result<Vec<Token>> {
        Scanner::new(source, "test").scan_tokens()
    }

    fn kinds_and_text(source: &str) -> Vec<(TokenKind, String)> {
        scan(source)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    #[test]
    fn test_simple_sexpr() {
        let tokens = kinds_and_text("(+ 1 2)");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Separator, "(".to_string()),
                (TokenKind::Identifier, "+".to_string()),
                (TokenKind::Number, "1".to_string()),
                (TokenKind::Number, "2".to_string()),
                (TokenKind::Separator, ")".to_string()),
            ]
        );
    }

    #[test]
    fn test_signed_numbers_and_operators() {
        let tokens = kinds_and_text("-5 +3.25 - +");
        assert_eq!(tokens[0], (TokenKind::Number, "-5".to_string()));
        assert_eq!(tokens[1], (TokenKind::Number, "+3.25".to_string()));
        assert_eq!(tokens[2], (TokenKind::Identifier, "-".to_string()));
        assert_eq!(tokens[3], (TokenKind::Identifier, "+".to_string()));
    }

    #[test]
    fn test_malformed_number() {
        let err = scan("1.2.3").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.message(), "malformed number");
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = kinds_and_text(">= <= != > < =");
        let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec![">=", "<=", "!=", ">", "<", "="]);
        assert!(tokens.iter().all(|(k, _)| *k == TokenKind::Identifier));
    }

    #[test]
    fn test_lone_bang_is_unknown() {
        let err = scan("!").unwrap_err();
        assert_eq!(err.message(), "unknown character '!'");
    }

    #[test]
    fn test_keyword_drops_colon() {
        let tokens = kinds_and_text("(get-key l :name)");
        assert_eq!(tokens[3], (TokenKind::Keyword, "name".to_string()));
    }

    #[test]
    fn test_identifier_with_namespace() {
        let tokens = kinds_and_text("list:push foo-bar2");
        assert_eq!(tokens[0], (TokenKind::Identifier, "list:push".to_string()));
        assert_eq!(tokens[1], (TokenKind::Identifier, "foo-bar2".to_string()));
    }

    #[test]
    fn test_underscore_splits_identifiers() {
        let texts: Vec<String> = kinds_and_text("a_b").into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["a", "_", "b"]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = kinds_and_text(r#""a\tb\n\"c\"""#);
        assert_eq!(tokens[0], (TokenKind::String, "a\tb\n\"c\"".to_string()));
    }

    #[test]
    fn test_unclosed_string() {
        let err = scan("\"abc").unwrap_err();
        assert_eq!(err.message(), "unclosed string literal");
    }

    #[test]
    fn test_unknown_character() {
        let err = scan("(a [b])").unwrap_err();
        assert_eq!(err.message(), "unknown character '['");
        assert_eq!(err.position().column, 4);
    }

    #[test]
    fn test_positions_track_lines() {
        let tokens = scan("(a\n  b)").unwrap();
        assert_eq!((tokens[1].pos.line, tokens[1].pos.column), (1, 2));
        assert_eq!((tokens[2].pos.line, tokens[2].pos.column), (2, 3));
        assert_eq!(&*tokens[2].pos.source, "test");
    }
}
