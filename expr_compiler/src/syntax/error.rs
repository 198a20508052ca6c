//! Syntax errors raised while parsing one expression

use super::sink::Diagnostic;
use crate::grammar::grammar_error_code;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use expr_grammar::{GrammarError, ParseError, Span};

pub type SyntaxResult<T> = Result<T, SyntaxError>;

pub const TIME_FORMAT_MESSAGE: &str =
    "time format needs to be 'i', 'c', or 't', with an optional 'd'";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lexical(#[from] LexerError),

    #[error("Unexpected {found}")]
    UnexpectedToken { found: String, span: Span },

    #[error("Unexpected end of expression")]
    UnexpectedEnd { span: Span },

    #[error("{}", TIME_FORMAT_MESSAGE)]
    InvalidTimeFormat { suffix: String, span: Span },

    #[error("No reduction for rule {rule} of {nonterminal}")]
    UnhandledReduction {
        nonterminal: String,
        rule: u32,
        span: Span,
    },

    #[error("Expression nesting exceeds {limit} parse stack entries")]
    MaxParseDepth { limit: usize, span: Span },

    #[error("Expression nests deeper than {limit} levels")]
    MaxTreeDepth { limit: usize, span: Span },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Internal parser error: {message}")]
    Internal { message: String },
}

impl From<ParseError> for SyntaxError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::NotConfigured { grammar } => {
                SyntaxError::Grammar(GrammarError::NotConfigured { grammar })
            }
            ParseError::UnexpectedToken { found, span } => {
                SyntaxError::UnexpectedToken { found, span }
            }
            ParseError::UnknownTerminal { code, span } => SyntaxError::UnexpectedToken {
                found: format!("token class {}", code),
                span,
            },
            ParseError::TrailingInput { span } => SyntaxError::UnexpectedToken {
                found: String::from("input after the end of the expression"),
                span,
            },
            ParseError::StackOverflow { limit, span } => SyntaxError::MaxParseDepth { limit, span },
            ParseError::Internal { message } => SyntaxError::Internal { message },
        }
    }
}

impl SyntaxError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        SyntaxError::Internal {
            message: message.into(),
        }
    }

    /// Rewrite an unexpected-token error raised on the end-of-input token
    pub(crate) fn at_end_of_input(self) -> Self {
        match self {
            SyntaxError::UnexpectedToken { span, .. } => SyntaxError::UnexpectedEnd { span },
            other => other,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexical(error) => error.error_code(),
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEnd { .. } => codes::syntax::UNEXPECTED_END,
            Self::InvalidTimeFormat { .. } => codes::syntax::INVALID_TIME_FORMAT,
            Self::UnhandledReduction { .. } => codes::syntax::UNHANDLED_REDUCTION,
            Self::MaxParseDepth { .. } => codes::syntax::MAX_PARSE_DEPTH,
            Self::MaxTreeDepth { .. } => codes::syntax::MAX_TREE_DEPTH,
            Self::Grammar(error) => grammar_error_code(error),
            Self::Internal { .. } => codes::syntax::INTERNAL_PARSER_ERROR,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexical(error) => error.span(),
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEnd { span }
            | Self::InvalidTimeFormat { span, .. }
            | Self::UnhandledReduction { span, .. }
            | Self::MaxParseDepth { span, .. }
            | Self::MaxTreeDepth { span, .. } => Some(*span),
            Self::Grammar(_) | Self::Internal { .. } => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    /// The message followed by the source line and a caret underline
    pub fn render(&self, source: &str) -> String {
        match self.span() {
            Some(span) => format!("{}\n{}", self, span.error_text(source)),
            None => self.to_string(),
        }
    }

    pub fn diagnostic(&self, source: &str) -> Diagnostic {
        Diagnostic {
            code: self.error_code(),
            message: self.to_string(),
            span: self.span(),
            rendered: self.render(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use expr_grammar::Position;

    fn span(from: u32, to: u32) -> Span {
        Span::new(
            Position::new(from as usize - 1, from),
            Position::new(to as usize - 1, to),
        )
    }

    #[test]
    fn parse_errors_convert() {
        let err: SyntaxError = ParseError::StackOverflow {
            limit: 8,
            span: span(3, 4),
        }
        .into();
        assert_matches!(err, SyntaxError::MaxParseDepth { limit: 8, .. });
        assert_eq!(err.error_code(), codes::syntax::MAX_PARSE_DEPTH);

        let err: SyntaxError = ParseError::NotConfigured {
            grammar: "g".into(),
        }
        .into();
        assert_matches!(err, SyntaxError::Grammar(GrammarError::NotConfigured { .. }));
        assert_eq!(err.error_code(), codes::grammar::NOT_CONFIGURED);
    }

    #[test]
    fn end_of_input_rewrite_keeps_span() {
        let err = SyntaxError::UnexpectedToken {
            found: "end of expression".into(),
            span: span(4, 4),
        }
        .at_end_of_input();
        assert_matches!(err, SyntaxError::UnexpectedEnd { span } if span.start.column == 4);
    }

    #[test]
    fn render_underlines_the_span() {
        let err = SyntaxError::UnexpectedToken {
            found: "'*'".into(),
            span: span(5, 6),
        };
        assert_eq!(err.render("a + * b"), "Unexpected '*'\na + * b\n    ^");
    }

    #[test]
    fn time_format_message_is_fixed() {
        let err = SyntaxError::InvalidTimeFormat {
            suffix: "x".into(),
            span: span(1, 2),
        };
        assert_eq!(err.to_string(), TIME_FORMAT_MESSAGE);
        assert_eq!(err.category(), "Syntax");
    }
}
