use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::{Diagnostic, SyntaxError};
use expr_grammar::Span;

/// Semantic errors raised while turning a tree into filters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Unsupported constant type: {kind}")]
    UnsupportedConstant { kind: &'static str, span: Span },

    #[error("Unknown unary operator:\"{op}\".")]
    UnknownUnaryOperator { op: char, span: Span },

    #[error("Unknown binary operator:\"{op}\".")]
    UnknownBinaryOperator { op: char, span: Span },

    #[error("Unknown function:\"{name}\".")]
    UnknownFunction { name: String, span: Span },

    #[error(
        "Parsing of your expression has failed. Function \"{function}\" expects {expected} \
         variable argument(s) but {available} were supplied."
    )]
    ArgumentUnderflow {
        function: String,
        expected: usize,
        available: usize,
        span: Span,
    },

    #[error("Function \"{function}\" expects a variable here, not a list")]
    ListAsVariable { function: String, span: Span },

    #[error("Cannot execute {function} expression: {reason}")]
    UnsupportedFilter {
        function: String,
        reason: &'static str,
        span: Span,
    },

    #[error("{node} left {found} name(s) on the stack, expected {expected}")]
    StackImbalance {
        node: String,
        expected: usize,
        found: usize,
        span: Option<Span>,
    },

    #[error("Too many {limit}: {value} exceeds the limit of {max}")]
    LimitExceeded {
        limit: &'static str,
        value: usize,
        max: usize,
        span: Option<Span>,
    },
}

impl CompileError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnsupportedConstant { .. } => codes::compile::UNSUPPORTED_CONSTANT,
            Self::UnknownUnaryOperator { .. } | Self::UnknownBinaryOperator { .. } => {
                codes::compile::UNKNOWN_OPERATOR
            }
            Self::UnknownFunction { .. } => codes::compile::UNKNOWN_FUNCTION,
            Self::ArgumentUnderflow { .. } => codes::compile::ARGUMENT_UNDERFLOW,
            Self::ListAsVariable { .. } => codes::compile::LIST_AS_VARIABLE,
            Self::UnsupportedFilter { .. } => codes::compile::UNSUPPORTED_FILTER,
            Self::StackImbalance { .. } => codes::compile::STACK_IMBALANCE,
            Self::LimitExceeded { .. } => codes::compile::LIMIT_EXCEEDED,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnsupportedConstant { span, .. }
            | Self::UnknownUnaryOperator { span, .. }
            | Self::UnknownBinaryOperator { span, .. }
            | Self::UnknownFunction { span, .. }
            | Self::ArgumentUnderflow { span, .. }
            | Self::ListAsVariable { span, .. }
            | Self::UnsupportedFilter { span, .. } => Some(*span),
            Self::StackImbalance { span, .. } | Self::LimitExceeded { span, .. } => *span,
        }
    }

    /// Function the error is about, when there is one
    pub fn function(&self) -> Option<&str> {
        match self {
            Self::UnknownFunction { name, .. } => Some(name),
            Self::ArgumentUnderflow { function, .. }
            | Self::ListAsVariable { function, .. }
            | Self::UnsupportedFilter { function, .. } => Some(function),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Semantic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Semantic => "semantic",
        }
    }
}

/// Any failure to turn expression text into a pipeline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] CompileError),
}

impl From<LexerError> for ExpressionError {
    fn from(error: LexerError) -> Self {
        ExpressionError::Syntax(SyntaxError::Lexical(error))
    }
}

impl ExpressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::Semantic(_) => ErrorKind::Semantic,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Syntax(error) => error.error_code(),
            Self::Semantic(error) => error.error_code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax(error) => error.span(),
            Self::Semantic(error) => error.span(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

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

    #[test]
    fn messages_quote_the_offender() {
        let err = CompileError::UnknownFunction {
            name: "frob".into(),
            span: Span::default(),
        };
        assert_eq!(err.to_string(), "Unknown function:\"frob\".");
        let err = CompileError::UnknownBinaryOperator {
            op: '|',
            span: Span::default(),
        };
        assert_eq!(err.to_string(), "Unknown binary operator:\"|\".");
    }

    #[test]
    fn lexer_errors_classify_as_syntax() {
        let err: ExpressionError = LexerError::UnterminatedString {
            span: Span::default(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_matches!(err, ExpressionError::Syntax(SyntaxError::Lexical(_)));
    }

    #[test]
    fn semantic_render_points_at_the_node() {
        let span = Span::new(Position::new(4, 5), Position::new(11, 12));
        let err: ExpressionError = CompileError::UnsupportedConstant {
            kind: "String",
            span,
        }
        .into();
        assert_eq!(err.kind().as_str(), "semantic");
        assert_eq!(
            err.render("a + \"hello\""),
            "Unsupported constant type: String\na + \"hello\"\n    ^^^^^^^"
        );
        assert_eq!(err.diagnostic("a + \"hello\"").code, codes::compile::UNSUPPORTED_CONSTANT);
    }
}
