//! Per-expression error collection with cargo-style reporting
//!
//! Batch compilation records every event against the name of the expression
//! being compiled, so the final report can group diagnostics by expression.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// The expression a worker thread is currently compiling
#[derive(Debug, Clone)]
pub struct ExpressionContext {
    pub name: String,
    pub index: usize,
    pub started: DateTime<Utc>,
}

impl ExpressionContext {
    pub fn new(name: &str, index: usize) -> Self {
        Self {
            name: name.to_string(),
            index,
            started: Utc::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Utc::now() - self.started
    }
}

/// Totals over everything the collector has seen
#[derive(Debug, Clone)]
pub struct ProcessingSummary {
    pub total_expressions: usize,
    pub successful_expressions: usize,
    pub failed_expressions: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub elapsed: Duration,
}

impl Default for ProcessingSummary {
    fn default() -> Self {
        Self {
            total_expressions: 0,
            successful_expressions: 0,
            failed_expressions: 0,
            total_errors: 0,
            total_warnings: 0,
            elapsed: Duration::zero(),
        }
    }
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_expressions == 0 {
            0.0
        } else {
            self.successful_expressions as f64 / self.total_expressions as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

/// Thread-safe event store keyed by expression name
pub struct ErrorCollector {
    events: Mutex<BTreeMap<String, Vec<LogEvent>>>,
    started: DateTime<Utc>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(BTreeMap::new()),
            started: Utc::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<LogEvent>>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an expression so it counts even if it logs nothing
    pub fn record_expression(&self, context: &ExpressionContext) {
        self.lock().entry(context.name.clone()).or_default();
    }

    pub fn record_event(&self, expression: &str, event: LogEvent) {
        let mut events = self.lock();
        let total: usize = events.values().map(Vec::len).sum();
        if total >= MAX_ERROR_COLLECTION {
            return;
        }

        let entry = events.entry(expression.to_string()).or_default();
        if entry.len() < MAX_LOG_EVENTS_PER_EXPRESSION {
            entry.push(event);
        } else if entry.len() == MAX_LOG_EVENTS_PER_EXPRESSION {
            entry.push(LogEvent::warning(&format!(
                "Too many events for expression (limit: {})",
                MAX_LOG_EVENTS_PER_EXPRESSION
            )));
        }
    }

    pub fn get_expression_events(&self, expression: &str) -> Vec<LogEvent> {
        self.lock().get(expression).cloned().unwrap_or_default()
    }

    pub fn get_expression_errors(&self, expression: &str) -> Vec<LogEvent> {
        self.lock()
            .get(expression)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_events(&self) -> BTreeMap<String, Vec<LogEvent>> {
        self.lock().clone()
    }

    /// Expressions with at least one error, in name order
    pub fn get_failed_expressions(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.is_error()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.lock();
        let mut summary = ProcessingSummary {
            total_expressions: events.len(),
            elapsed: Utc::now() - self.started,
            ..ProcessingSummary::default()
        };

        for expression_events in events.values() {
            let errors = expression_events.iter().filter(|e| e.is_error()).count();
            summary.total_errors += errors;
            summary.total_warnings += expression_events.iter().filter(|e| e.is_warning()).count();
            if errors > 0 {
                summary.failed_expressions += 1;
            } else {
                summary.successful_expressions += 1;
            }
        }

        summary
    }

    pub fn total_event_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    /// (current, max, fraction used) against the collection limit
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = MAX_ERROR_COLLECTION;
        let fraction = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, fraction)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render collected errors and warnings grouped by expression
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (name, events) in &collector.get_all_events() {
        let issues: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if issues.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", name));
        for event in issues {
            let kind = if event.is_error() { "error" } else { "warning" };
            let location = event
                .span
                .as_ref()
                .map(|s| format!(" --> {}:{}", name, s.start.column))
                .unwrap_or_default();
            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                kind,
                event.code.as_str(),
                event.message,
                location
            ));

            if event.is_error() {
                output.push_str(&format!(
                    "  = severity: {}, category: {}\n",
                    event.severity(),
                    event.category()
                ));
            }
            for (key, value) in &event.context {
                if key != "expression" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use expr_grammar::{Position, Span};

    #[test]
    fn events_are_grouped_by_expression() {
        let collector = ErrorCollector::new();
        collector.record_expression(&ExpressionContext::new("ok", 0));
        collector.record_event(
            "bad",
            LogEvent::error(codes::compile::UNKNOWN_FUNCTION, "Unknown function:\"foo\"."),
        );
        collector.record_event("bad", LogEvent::warning("slow"));

        assert_eq!(collector.get_expression_errors("bad").len(), 1);
        assert_eq!(collector.get_expression_events("bad").len(), 2);
        assert_eq!(collector.get_failed_expressions(), vec!["bad".to_string()]);

        let summary = collector.get_summary();
        assert_eq!(summary.total_expressions, 2);
        assert_eq!(summary.failed_expressions, 1);
        assert_eq!(summary.successful_expressions, 1);
        assert!((summary.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn per_expression_limit_adds_one_marker() {
        let collector = ErrorCollector::new();
        for _ in 0..MAX_LOG_EVENTS_PER_EXPRESSION + 5 {
            collector.record_event("noisy", LogEvent::info("event"));
        }
        let events = collector.get_expression_events("noisy");
        assert!(events.len() <= MAX_LOG_EVENTS_PER_EXPRESSION + 1);
    }

    #[test]
    fn cargo_style_report_names_expression_and_column() {
        let collector = ErrorCollector::new();
        let span = Span::new(Position::new(2, 3), Position::new(3, 4));
        collector.record_event(
            "speed",
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "Unexpected '*'").with_span(span),
        );

        let report = format_cargo_style_errors(&collector);
        assert!(report.contains("Checking speed..."));
        assert!(report.contains("error[E050]: Unexpected '*' --> speed:3"));
        assert!(report.contains("Total errors: 1"));
    }
}
