//! Logging configuration: compile-time buffer limits plus runtime preferences

use crate::config::compile_time::logging::*;
use crate::config::runtime::{ErrorTarget, LogLevel, LoggingPreferences};
use std::path::Path;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; only the first call takes effect
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

pub(crate) fn preferences() -> &'static LoggingPreferences {
    RUNTIME_PREFERENCES.get_or_init(LoggingPreferences::default)
}

pub fn get_min_log_level() -> LogLevel {
    preferences().min_log_level
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    preferences().enable_console_logging
}

pub fn include_expression_context() -> bool {
    preferences().include_expression_context
}

/// Default destination for expression errors
pub fn error_target() -> ErrorTarget {
    preferences().error_target
}

pub fn print_grammar_report() -> bool {
    preferences().print_grammar_report
}

pub fn log_file() -> Option<&'static Path> {
    preferences().log_file.as_deref()
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_error_collection() -> usize {
    MAX_ERROR_COLLECTION
}

pub fn get_max_events_per_expression() -> usize {
    MAX_LOG_EVENTS_PER_EXPRESSION
}

/// Clip a message to the configured maximum length on a char boundary
pub fn truncate_message(message: &str) -> &str {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message;
    }
    let mut end = MAX_LOG_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Human-readable summary of the active logging configuration
pub fn get_config_summary() -> String {
    let prefs = preferences();
    format!(
        "level={} structured={} console={} file={} errors={} buffer={} max_errors={}",
        prefs.min_log_level.as_str(),
        prefs.use_structured_logging,
        prefs.enable_console_logging,
        prefs
            .log_file
            .as_deref()
            .map_or_else(|| String::from("none"), |p| p.display().to_string()),
        prefs.error_target.as_str(),
        LOG_BUFFER_SIZE,
        MAX_ERROR_COLLECTION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(truncate_message("short"), "short");
    }

    #[test]
    fn long_messages_are_clipped() {
        let long = "é".repeat(MAX_LOG_MESSAGE_LENGTH);
        let clipped = truncate_message(&long);
        assert!(clipped.len() <= MAX_LOG_MESSAGE_LENGTH);
        assert!(clipped.chars().all(|c| c == 'é'));
    }

    #[test]
    fn summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains(&format!("buffer={}", LOG_BUFFER_SIZE)));
    }
}
