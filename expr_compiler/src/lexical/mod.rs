//! Lexical analysis of expression text
//!
//! Scanning is eager: the whole expression is tokenized up front and the
//! parser then feeds the tokens to the grammar one at a time.

pub mod analyzer;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

use crate::tokens::Token;

/// Tokenize one expression with a fresh analyzer
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn tokenize_ends_with_eof() {
        let tokens = tokenize("x").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn empty_input_is_only_eof() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }
}
