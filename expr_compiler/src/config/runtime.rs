// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use super::compile_time::batch_processing::MAX_WORKER_THREADS;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Where expression errors are reported when no explicit sink is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorTarget {
    Console,
    Log,
    Silent,
}

impl ErrorTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTarget::Console => "console",
            ErrorTarget::Log => "log",
            ErrorTarget::Silent => "silent",
        }
    }
}

fn parse_error_target(value: &str) -> Option<ErrorTarget> {
    match value.to_lowercase().as_str() {
        "console" | "stderr" => Some(ErrorTarget::Console),
        "log" | "logging" => Some(ErrorTarget::Log),
        "silent" | "none" => Some(ErrorTarget::Silent),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of human-readable text
    pub use_structured_logging: bool,

    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Where parse and compile errors go by default
    pub error_target: ErrorTarget,

    /// Print the configured grammar's rules and states after configuration
    pub print_grammar_report: bool,

    /// Whether to include the current expression name in log messages
    pub include_expression_context: bool,

    /// Also append events to this file
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            error_target: env::var(env_vars::ERROR_TARGET)
                .ok()
                .and_then(|v| parse_error_target(&v))
                .unwrap_or(ErrorTarget::Console),
            print_grammar_report: env_flag(env_vars::PRINT_GRAMMAR_REPORT, false),
            include_expression_context: env_flag(env_vars::LOGGING_INCLUDE_CONTEXT, true),
            log_file: env::var_os(env_vars::LOGGING_FILE)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPreferences {
    /// Worker threads for batch compilation, clamped to the build limit
    pub threads: usize,

    /// Stop scheduling work after the first failed expression
    pub fail_fast: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        let threads = env::var(env_vars::BATCH_THREADS)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            });
        Self {
            threads: threads.clamp(1, MAX_WORKER_THREADS),
            fail_fast: env_flag(env_vars::BATCH_FAIL_FAST, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub logging: LoggingPreferences,
    pub batch: BatchPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "EXPR_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "EXPR_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "EXPR_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_CONTEXT: &str = "EXPR_LOGGING_INCLUDE_CONTEXT";
    pub const LOGGING_FILE: &str = "EXPR_LOGGING_FILE";
    pub const ERROR_TARGET: &str = "EXPR_ERROR_TARGET";
    pub const PRINT_GRAMMAR_REPORT: &str = "EXPR_PRINT_GRAMMAR";

    // Batch
    pub const BATCH_THREADS: &str = "EXPR_BATCH_THREADS";
    pub const BATCH_FAIL_FAST: &str = "EXPR_BATCH_FAIL_FAST";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_error_target_parsing() {
        assert_eq!(parse_error_target("Console"), Some(ErrorTarget::Console));
        assert_eq!(parse_error_target("log"), Some(ErrorTarget::Log));
        assert_eq!(parse_error_target("none"), Some(ErrorTarget::Silent));
        assert_eq!(parse_error_target("printer"), None);
    }

    #[test]
    fn test_batch_threads_within_limit() {
        let prefs = BatchPreferences::default();
        assert!(prefs.threads >= 1);
        assert!(prefs.threads <= MAX_WORKER_THREADS);
    }
}
