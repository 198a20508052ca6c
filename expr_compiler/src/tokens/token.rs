use super::terminal;
use expr_grammar::{GrammarToken, Span, TerminalCode, EOF_CODE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Single-character operator or delimiter
    Char(char),
    Identifier(String),
    Integer(i64),
    Float(f64),
    /// String literal contents without the quotes
    String(String),
    Bool(bool),
    Space,
    Eof,
}

/// A scanned token with its source span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_space(&self) -> bool {
        matches!(self.kind, TokenKind::Space)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self.kind {
            TokenKind::Char(ch) => Some(ch),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Integer(value) => Some(value),
            _ => None,
        }
    }
}

impl GrammarToken for Token {
    fn terminal(&self) -> TerminalCode {
        match self.kind {
            TokenKind::Char(ch) => ch as TerminalCode,
            TokenKind::Identifier(_) => terminal::IDENTIFIER,
            TokenKind::Integer(_) => terminal::INTEGER,
            TokenKind::Float(_) => terminal::FLOAT,
            TokenKind::String(_) => terminal::STRING,
            TokenKind::Bool(_) => terminal::BOOL,
            TokenKind::Space => terminal::SPACE,
            TokenKind::Eof => EOF_CODE,
        }
    }

    fn span(&self) -> Span {
        self.span
    }

    fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Char(ch) => format!("'{}'", ch),
            TokenKind::Identifier(name) => format!("identifier \"{}\"", name),
            TokenKind::Integer(value) => format!("integer {}", value),
            TokenKind::Float(value) => format!("float {}", value),
            TokenKind::String(value) => format!("string \"{}\"", value),
            TokenKind::Bool(value) => format!("boolean {}", value),
            TokenKind::Space => "whitespace".to_string(),
            TokenKind::Eof => "end of expression".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Char(ch) => write!(f, "{}", ch),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Integer(value) => write!(f, "{}", value),
            TokenKind::Float(value) => write!(f, "{}", value),
            TokenKind::String(value) => write!(f, "\"{}\"", value),
            TokenKind::Bool(value) => write!(f, "{}", value),
            TokenKind::Space => write!(f, " "),
            TokenKind::Eof => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr_grammar::Position;

    fn at(col: u32) -> Span {
        let start = Position::new(col as usize - 1, col);
        Span::new(start, start.advance('x'))
    }

    #[test]
    fn punctuation_uses_its_character_code() {
        let plus = Token::new(TokenKind::Char('+'), at(1));
        assert_eq!(plus.terminal(), '+' as u32);
        assert_eq!(plus.describe(), "'+'");
    }

    #[test]
    fn token_classes_do_not_collide_with_characters() {
        let classes = [
            terminal::IDENTIFIER,
            terminal::INTEGER,
            terminal::FLOAT,
            terminal::STRING,
            terminal::BOOL,
            terminal::SPACE,
        ];
        for code in classes {
            assert!(code > 255);
            assert_ne!(code, EOF_CODE);
        }
        assert!(terminal::PUNCTUATION.iter().all(|c| (*c as u32) < 256));
    }

    #[test]
    fn accessors_match_kind() {
        let ident = Token::new(TokenKind::Identifier("pressure".into()), at(1));
        assert_eq!(ident.as_identifier(), Some("pressure"));
        assert_eq!(ident.terminal(), terminal::IDENTIFIER);
        assert_eq!(ident.as_char(), None);

        let eof = Token::new(TokenKind::Eof, at(4));
        assert!(eof.is_eof());
        assert_eq!(eof.terminal(), EOF_CODE);
    }
}
