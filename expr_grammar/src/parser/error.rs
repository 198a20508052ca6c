use crate::utils::Span;

/// Failures raised by the generic driver
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Grammar '{grammar}' is not configured")]
    NotConfigured { grammar: String },

    #[error("Unexpected {found}")]
    UnexpectedToken { found: String, span: Span },

    #[error("Token class {code} is not part of the grammar")]
    UnknownTerminal { code: u32, span: Span },

    #[error("Input continues after a complete expression")]
    TrailingInput { span: Span },

    #[error("Parse stack exceeded {limit} entries")]
    StackOverflow { limit: usize, span: Span },

    #[error("Internal parser error: {message}")]
    Internal { message: String },
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnknownTerminal { span, .. }
            | ParseError::TrailingInput { span }
            | ParseError::StackOverflow { span, .. } => Some(*span),
            ParseError::NotConfigured { .. } | ParseError::Internal { .. } => None,
        }
    }
}
