//! Global logging for the expression compiler
//!
//! A process-wide [`LoggingService`] and [`ErrorCollector`] live in
//! `OnceLock`s. Each worker thread may set the expression it is compiling;
//! the macros tag events with it and route errors into the collector.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ExpressionContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, FileLogger, Logger, LoggingService, MemoryLogger, MultiLogger, NullLogger,
    StructuredLogger,
};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static EXPRESSION_CONTEXT: RefCell<Option<ExpressionContext>> = const { RefCell::new(None) };
}

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    init_global_logging_with_service(Arc::new(LoggingService::with_config()))?;

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::success(
            codes::success::SYSTEM_INITIALIZATION_COMPLETED,
            "Global logging system initialized",
        ));
    }
    Ok(())
}

/// Initialize with a custom service (tests, embedding applications)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    // A collector may already exist if errors were recorded before init
    let _ = GLOBAL_ERROR_COLLECTOR.set(Arc::new(ErrorCollector::new()));
    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// The collector always exists, so errors are kept even without a logger
pub fn global_error_collector() -> &'static ErrorCollector {
    GLOBAL_ERROR_COLLECTOR
        .get_or_init(|| Arc::new(ErrorCollector::new()))
        .as_ref()
}

/// Set the expression context for the current thread
pub fn set_expression_context(name: &str, index: usize) {
    let context = ExpressionContext::new(name, index);
    global_error_collector().record_expression(&context);
    EXPRESSION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_expression_context() {
    EXPRESSION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the expression context set, clearing it afterwards
pub fn with_expression_context<F, R>(name: &str, index: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_expression_context(name, index);
    let result = f();
    clear_expression_context();
    result
}

pub fn get_current_expression_context() -> Option<ExpressionContext> {
    EXPRESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_context(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    event.message = config::truncate_message(&event.message).to_string();
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if config::include_expression_context() {
        if let Some(expr_ctx) = get_current_expression_context() {
            event = event.with_expression(&expr_ctx.name);
        }
    }
    event
}

/// Backing function of `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<expr_grammar::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = attach_context(LogEvent::error(code, message), context);
    if let Some(s) = span {
        event = event.with_span(s);
    }

    if let Some(expr_ctx) = get_current_expression_context() {
        global_error_collector().record_event(&expr_ctx.name, event.clone());
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Backing function of the non-error macros
pub fn log_with_context(event: LogEvent, context: Vec<(&str, &str)>) {
    let event = attach_context(event, context);
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

pub fn get_processing_summary() -> ProcessingSummary {
    global_error_collector().get_summary()
}

pub fn print_cargo_style_summary() {
    println!(
        "{}",
        collector::format_cargo_style_errors(global_error_collector())
    );
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::from("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    let collector = global_error_collector();
    let (current, max, fraction) = collector.get_capacity_info();
    diagnostics.push_str(&format!(
        "Capacity: {}/{} ({:.1}%)\n",
        current,
        max,
        fraction * 100.0
    ));
    let summary = collector.get_summary();
    diagnostics.push_str(&format!("Expressions seen: {}\n", summary.total_expressions));
    diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());
    diagnostics
}

/// Error logging that falls back to stderr when no logger is installed
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_context_management() {
        assert!(get_current_expression_context().is_none());

        set_expression_context("velocity_mag", 3);
        let context = get_current_expression_context().unwrap();
        assert_eq!(context.name, "velocity_mag");
        assert_eq!(context.index, 3);

        clear_expression_context();
        assert!(get_current_expression_context().is_none());
    }

    #[test]
    fn test_errors_are_collected_per_expression() {
        let result = with_expression_context("ctx_test_expr", 0, || {
            crate::log_error!(
                codes::compile::UNKNOWN_FUNCTION,
                "Unknown function:\"nope\".",
                "function" => "nope"
            );
            7
        });

        assert_eq!(result, 7);
        assert!(get_current_expression_context().is_none());
        let errors = global_error_collector().get_expression_errors("ctx_test_expr");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].context.get("function"), Some(&"nope".to_string()));
    }

    #[test]
    fn test_macros_without_logger_do_not_panic() {
        crate::log_info!("info", "count" => 1);
        crate::log_warning!("warning");
        crate::log_debug!("debug", "flag" => true);
        crate::log_success!(codes::success::PARSE_COMPLETE, "parsed");
        safe_log_error(codes::system::INTERNAL_ERROR, "fallback");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Capacity:"));
    }
}
