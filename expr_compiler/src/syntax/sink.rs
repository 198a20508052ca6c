//! Where user-facing expression errors are reported
//!
//! Stages log their own failures; a sink decides how the rendered error
//! reaches the person who wrote the expression.

use crate::config::ErrorTarget;
use crate::log_debug;
use crate::logging::Code;
use expr_grammar::Span;

/// A reportable error with its rendered form
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    /// Message, source line and caret underline
    pub rendered: String,
}

pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Rendered errors to stderr
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("error[{}]: {}", diagnostic.code, diagnostic.rendered);
    }
}

/// Rendered errors as debug log events
#[derive(Debug, Default)]
pub struct LoggingSink;

impl ErrorSink for LoggingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log_debug!(&diagnostic.rendered, "code" => diagnostic.code);
    }
}

/// Keeps every diagnostic for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[derive(Debug, Default)]
pub struct SilentSink;

impl ErrorSink for SilentSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// The sink selected by the runtime error target
pub fn sink_for(target: ErrorTarget) -> Box<dyn ErrorSink> {
    match target {
        ErrorTarget::Console => Box::new(ConsoleSink),
        ErrorTarget::Log => Box::new(LoggingSink),
        ErrorTarget::Silent => Box::new(SilentSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    fn diagnostic(message: &str) -> Diagnostic {
        Diagnostic {
            code: codes::syntax::UNEXPECTED_TOKEN,
            message: message.to_string(),
            span: None,
            rendered: message.to_string(),
        }
    }

    #[test]
    fn collecting_sink_keeps_order() {
        let mut sink = CollectingSink::new();
        sink.report(diagnostic("first"));
        sink.report(diagnostic("second"));
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }

    #[test]
    fn every_target_has_a_sink() {
        for target in [ErrorTarget::Console, ErrorTarget::Log, ErrorTarget::Silent] {
            let mut sink = sink_for(target);
            if target != ErrorTarget::Console {
                sink.report(diagnostic("quiet"));
            }
        }
    }
}
