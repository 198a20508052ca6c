//! Log events emitted by the expression compiler

use super::codes::{self, Code};
use chrono::{DateTime, Utc};
use expr_grammar::Span;
use std::collections::BTreeMap;

pub use crate::config::LogLevel;

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Warning without a specific code
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Tag the event with the expression it concerns
    pub fn with_expression(self, name: &str) -> Self {
        self.with_context("expression", name)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// One-line display form
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}", s))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    /// Display form with code metadata and context
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            let action = codes::get_action(self.code.as_str());
            if action != "No specific action available" {
                output.push_str(&format!("\n  Recommended action: {}", action));
            }
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// JSON line for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": codes::get_description(self.code.as_str()),
            });
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_offset": span.start.offset,
                "start_column": span.start.column,
                "end_offset": span.end.offset,
                "end_column": span.end.column,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr_grammar::Position;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::compile::UNKNOWN_FUNCTION, "Unknown function");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E182");
        assert_eq!(event.category(), "Compile");
    }

    #[test]
    fn test_event_formatting_uses_columns() {
        let span = Span::new(Position::new(2, 3), Position::new(3, 4));
        let event =
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "Unexpected '*'").with_span(span);
        let formatted = event.format();

        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E050"));
        assert!(formatted.ends_with("at column 3"));
    }

    #[test]
    fn test_expression_context() {
        let event = LogEvent::success(codes::success::COMPILE_COMPLETE, "Compiled")
            .with_expression("speed")
            .with_context("filters", "3");

        assert!(event.is_info());
        assert_eq!(event.context.get("expression"), Some(&"speed".to_string()));
        assert!(event.format_detailed().contains("filters: 3"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::batch::DUPLICATE_DEFINITION, "Duplicate name")
            .with_expression("a");

        let json = event.format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["code"], "B002");
        assert_eq!(value["context"]["expression"], "a");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }
}
