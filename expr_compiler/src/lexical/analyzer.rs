//! Expression scanner
//!
//! Turns expression text into [`Token`]s with column spans. Runs of
//! whitespace collapse into one `Space` token; the parser drops them.

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::tokens::{terminal, Token, TokenKind};
use crate::{log_debug, log_error};
use expr_grammar::{Position, Span};

/// Scanner failures, each carrying the offending span where one exists
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at {span}")]
    InvalidCharacter { character: char, span: Span },

    #[error("Unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("Invalid number format: '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, span: Span },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, span: Span },

    #[error("Expression too long: {length} bytes (max {MAX_EXPRESSION_LENGTH})")]
    ExpressionTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize, span: Span },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::ExpressionTooLong { .. } => codes::lexical::EXPRESSION_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::InvalidCharacter { span, .. }
            | LexerError::UnterminatedString { span }
            | LexerError::InvalidNumber { span, .. }
            | LexerError::IdentifierTooLong { span, .. }
            | LexerError::StringTooLarge { span, .. }
            | LexerError::TooManyTokens { span, .. } => Some(*span),
            LexerError::ExpressionTooLong { .. } => None,
        }
    }
}

/// Token counts from the last scan
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub punctuation_tokens: usize,
    pub space_tokens: usize,
}

impl LexicalMetrics {
    fn record(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token.kind {
            TokenKind::Identifier(_) => self.identifier_tokens += 1,
            TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::String(_)
            | TokenKind::Bool(_) => self.literal_tokens += 1,
            TokenKind::Char(_) => self.punctuation_tokens += 1,
            TokenKind::Space => self.space_tokens += 1,
            TokenKind::Eof => {}
        }
    }
}

struct Cursor<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.pos.offset..).unwrap_or("")
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn text_since(&self, start: Position) -> &'a str {
        self.source.get(start.offset..self.pos.offset).unwrap_or("")
    }

    fn span_since(&self, start: Position) -> Span {
        Span::new(start, self.pos)
    }
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

/// Scanner over one expression
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Scan `source` into tokens ending with `Eof`
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<Token>, LexerError> {
        self.metrics = LexicalMetrics::default();

        let result = self.scan(source);
        match &result {
            Ok(tokens) => {
                log_debug!("Expression scanned",
                    "tokens" => tokens.len(),
                    "identifiers" => self.metrics.identifier_tokens,
                    "literals" => self.metrics.literal_tokens
                );
            }
            Err(error) => match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span),
                None => log_error!(error.error_code(), &error.to_string()),
            },
        }
        result
    }

    fn scan(&mut self, source: &str) -> Result<Vec<Token>, LexerError> {
        if source.len() > MAX_EXPRESSION_LENGTH {
            return Err(LexerError::ExpressionTooLong {
                length: source.len(),
            });
        }

        let mut cursor = Cursor::new(source);
        let mut tokens = Vec::new();

        while let Some(ch) = cursor.peek() {
            if tokens.len() >= MAX_TOKEN_COUNT {
                return Err(LexerError::TooManyTokens {
                    count: tokens.len(),
                    span: Span::empty_at(cursor.pos),
                });
            }

            let start = cursor.pos;
            let kind = if is_space(ch) {
                cursor.bump_while(is_space);
                TokenKind::Space
            } else if ch.is_ascii_digit()
                || (ch == '.' && cursor.peek_second().is_some_and(|c| c.is_ascii_digit()))
            {
                self.scan_number(&mut cursor)?
            } else if is_identifier_start(ch) {
                self.scan_identifier(&mut cursor)?
            } else if ch == '"' {
                self.scan_string(&mut cursor)?
            } else if terminal::PUNCTUATION.contains(&ch) {
                cursor.bump();
                TokenKind::Char(ch)
            } else {
                cursor.bump();
                return Err(LexerError::InvalidCharacter {
                    character: ch,
                    span: cursor.span_since(start),
                });
            };

            let token = Token::new(kind, cursor.span_since(start));
            self.metrics.record(&token);
            tokens.push(token);
        }

        tokens.push(Token::new(TokenKind::Eof, Span::empty_at(cursor.pos)));
        Ok(tokens)
    }

    fn scan_number(&self, cursor: &mut Cursor<'_>) -> Result<TokenKind, LexerError> {
        let start = cursor.pos;
        let mut is_float = false;

        cursor.bump_while(|c| c.is_ascii_digit());
        if cursor.peek() == Some('.') {
            is_float = true;
            cursor.bump();
            cursor.bump_while(|c| c.is_ascii_digit());
        }

        if matches!(cursor.peek(), Some('e' | 'E')) {
            let has_digits = match cursor.peek_second() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => cursor
                    .rest()
                    .chars()
                    .nth(2)
                    .is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if has_digits {
                is_float = true;
                cursor.bump();
                if matches!(cursor.peek(), Some('+' | '-')) {
                    cursor.bump();
                }
                cursor.bump_while(|c| c.is_ascii_digit());
            }
        }

        let text = cursor.text_since(start);
        let invalid = || LexerError::InvalidNumber {
            text: text.to_string(),
            span: cursor.span_since(start),
        };
        if is_float {
            text.parse::<f64>().map(TokenKind::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>()
                .map(TokenKind::Integer)
                .map_err(|_| invalid())
        }
    }

    fn scan_identifier(&self, cursor: &mut Cursor<'_>) -> Result<TokenKind, LexerError> {
        let start = cursor.pos;
        cursor.bump_while(is_identifier_continue);
        let text = cursor.text_since(start);

        if text.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length: text.len(),
                span: cursor.span_since(start),
            });
        }

        Ok(match text {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            _ => TokenKind::Identifier(text.to_string()),
        })
    }

    fn scan_string(&self, cursor: &mut Cursor<'_>) -> Result<TokenKind, LexerError> {
        let start = cursor.pos;
        cursor.bump(); // opening quote
        let body_start = cursor.pos;
        cursor.bump_while(|c| c != '"');

        if cursor.peek() != Some('"') {
            return Err(LexerError::UnterminatedString {
                span: Span::new(start, start.advance('"')),
            });
        }
        let body = cursor.text_since(body_start).to_string();
        cursor.bump(); // closing quote

        if body.len() > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size: body.len(),
                span: cursor.span_since(start),
            });
        }
        Ok(TokenKind::String(body))
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kinds(source: &str) -> Vec<TokenKind> {
        LexicalAnalyzer::new()
            .tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_operators_and_identifiers() {
        assert_eq!(
            kinds("a+b*c"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Char('+'),
                TokenKind::Identifier("b".into()),
                TokenKind::Char('*'),
                TokenKind::Identifier("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_distinguish_integers_and_floats() {
        assert_eq!(
            kinds("3 3.5 .5 2e3 1.5E-2"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Space,
                TokenKind::Float(3.5),
                TokenKind::Space,
                TokenKind::Float(0.5),
                TokenKind::Space,
                TokenKind::Float(2000.0),
                TokenKind::Space,
                TokenKind::Float(0.015),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn minus_is_never_part_of_a_number() {
        assert_eq!(
            kinds("-3"),
            vec![TokenKind::Char('-'), TokenKind::Integer(3), TokenKind::Eof]
        );
    }

    #[test]
    fn exponent_without_digits_is_left_alone() {
        assert_eq!(
            kinds("2e"),
            vec![
                TokenKind::Integer(2),
                TokenKind::Identifier("e".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn identifiers_may_contain_dots_and_booleans_are_literals() {
        assert_eq!(
            kinds("mesh.coords true false"),
            vec![
                TokenKind::Identifier("mesh.coords".into()),
                TokenKind::Space,
                TokenKind::Bool(true),
                TokenKind::Space,
                TokenKind::Bool(false),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(
            kinds("a \t\n b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Space,
                TokenKind::Identifier("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_keep_their_contents() {
        let tokens = LexicalAnalyzer::new().tokenize("val4mat(x,\"1\")").unwrap();
        assert_eq!(tokens[4].kind, TokenKind::String("1".into()));
        assert_eq!(tokens[4].span.start.column, 11);
        assert_eq!(tokens[4].span.end.column, 14);
    }

    #[test]
    fn spans_track_columns() {
        let tokens = LexicalAnalyzer::new().tokenize("ab + cd").unwrap();
        assert_eq!(tokens[0].span.start.column, 1);
        assert_eq!(tokens[0].span.end.column, 3);
        assert_eq!(tokens[2].span.start.column, 4);
        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.span.start.offset, 7);
    }

    #[test]
    fn invalid_character_reports_span() {
        let err = LexicalAnalyzer::new().tokenize("a $ b").unwrap_err();
        assert_matches!(err, LexerError::InvalidCharacter { character: '$', span } if span.start.column == 3);
        assert_eq!(err.error_code(), codes::lexical::INVALID_CHARACTER);
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let err = LexicalAnalyzer::new().tokenize("f(\"abc").unwrap_err();
        assert_matches!(err, LexerError::UnterminatedString { span } if span.start.column == 3);
    }

    #[test]
    fn integer_overflow_is_invalid_number() {
        let err = LexicalAnalyzer::new()
            .tokenize("99999999999999999999")
            .unwrap_err();
        assert_matches!(err, LexerError::InvalidNumber { .. });
    }

    #[test]
    fn metrics_count_token_classes() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer.tokenize("sin(x) + 2").unwrap();
        let metrics = analyzer.metrics();
        assert_eq!(metrics.identifier_tokens, 2);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.punctuation_tokens, 3);
        assert_eq!(metrics.space_tokens, 2);
    }
}
