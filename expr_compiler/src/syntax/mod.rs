//! Syntax analysis: expression text to [`ExprNode`]
//!
//! [`ExprParser`] drives the shared LR automaton and builds nodes through an
//! [`ExprNodeFactory`](crate::grammar::ExprNodeFactory). Failures are plain
//! `Result`s; [`parse_reporting`] also hands the rendered error to a sink.

mod error;
mod parser;
pub mod sink;

pub use error::{SyntaxError, SyntaxResult, TIME_FORMAT_MESSAGE};
pub use parser::{normalize, ExprParser, ParseValue, Reduced};
pub use sink::{
    sink_for, CollectingSink, ConsoleSink, Diagnostic, ErrorSink, LoggingSink, SilentSink,
};

use crate::grammar::ExprNode;
use crate::log_error;

/// Parse one expression with the default node factory
pub fn parse(text: &str) -> SyntaxResult<ExprNode> {
    let result = ExprParser::new().and_then(|mut parser| parser.parse(text));
    if let Err(error) = &result {
        // The scanner logs its own failures
        if !matches!(error, SyntaxError::Lexical(_)) {
            match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span),
                None => log_error!(error.error_code(), &error.to_string()),
            }
        }
    }
    result
}

/// Parse, sending a failure to `sink` as well as returning it
pub fn parse_reporting(text: &str, sink: &mut dyn ErrorSink) -> SyntaxResult<ExprNode> {
    parse(text).map_err(|error| {
        sink.report(error.diagnostic(&normalize(text)));
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_returns_tree() {
        assert_matches!(parse("a*2").unwrap(), ExprNode::Binary { op: '*', .. });
    }

    #[test]
    fn parse_reporting_collects() {
        let mut sink = CollectingSink::new();
        let err = parse_reporting("(a", &mut sink).unwrap_err();
        assert_matches!(err, SyntaxError::UnexpectedEnd { .. });
        assert_eq!(sink.messages(), vec!["Unexpected end of expression"]);
    }
}
