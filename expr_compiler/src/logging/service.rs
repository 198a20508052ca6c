//! Logger implementations and the logging service

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use expr_grammar::Span;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front end over one [`Logger`]
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Service built from the runtime preferences
    pub fn with_config() -> Self {
        Self::from_preferences(config::preferences())
    }

    /// Console output when enabled, plus the log file when one is set.
    /// A log file that cannot be opened is reported on stderr and skipped.
    pub fn from_preferences(prefs: &LoggingPreferences) -> Self {
        let min_level = prefs.min_log_level;
        let mut loggers: Vec<Arc<dyn Logger>> = Vec::new();

        if prefs.enable_console_logging {
            if prefs.use_structured_logging {
                loggers.push(Arc::new(StructuredLogger::new(min_level)));
            } else {
                loggers.push(Arc::new(ConsoleLogger::new(min_level)));
            }
        }

        if let Some(path) = &prefs.log_file {
            match FileLogger::new(path, min_level, prefs.use_structured_logging) {
                Ok(file) => loggers.push(Arc::new(file)),
                Err(error) => eprintln!("Cannot open log file {}: {}", path.display(), error),
            }
        }

        let logger: Arc<dyn Logger> = if loggers.len() > 1 {
            let mut multi = MultiLogger::new(min_level);
            for logger in loggers {
                multi.add_logger(logger);
            }
            Arc::new(multi)
        } else {
            loggers.pop().unwrap_or_else(|| Arc::new(NullLogger))
        };

        Self::new(logger, min_level)
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_error_with_span(&self, error_code: Code, message: &str, span: Span) {
        self.log_event(LogEvent::error(error_code, message).with_span(span));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_success_with_context(
        &self,
        success_code: Code,
        message: &str,
        context: Vec<(&str, &str)>,
    ) {
        let event = context
            .into_iter()
            .fold(LogEvent::success(success_code, message), |event, (k, v)| {
                event.with_context(k, v)
            });
        self.log_event(event);
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Drops every event
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Human-readable lines; errors to stderr, everything else to stdout
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.level {
                LogLevel::Error => eprintln!("{}", event.format()),
                _ => println!("{}", event.format()),
            }
        }
    }
}

/// JSON lines for tooling
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = event.format_json().unwrap_or_else(|_| event.format());
        match event.level {
            LogLevel::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// Bounded in-memory capture, used by tests and error summaries
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn get_events_by_category(&self, category: &str) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.category() == category)
            .cloned()
            .collect()
    }

    /// Events tagged with the given expression name
    pub fn get_events_for_expression(&self, name: &str) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.context.get("expression").map(String::as_str) == Some(name))
            .cloned()
            .collect()
    }

    pub fn get_summary(&self) -> EventSummary {
        let events = self.lock();
        EventSummary {
            total_count: events.len(),
            error_count: events.iter().filter(|e| e.is_error()).count(),
            warning_count: events.iter().filter(|e| e.is_warning()).count(),
            info_count: events.iter().filter(|e| e.is_info()).count(),
            critical_count: events
                .iter()
                .filter(|e| e.is_error() && e.requires_halt())
                .count(),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        let max_events = config::get_error_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }
        events.push(event.clone());
    }
}

/// Counts by level over a [`MemoryLogger`]
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub critical_count: usize,
}

impl EventSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_critical_errors(&self) -> bool {
        self.critical_count > 0
    }
}

/// Appends events to a file
pub struct FileLogger {
    file_path: PathBuf,
    min_level: LogLevel,
    structured: bool,
}

impl FileLogger {
    pub fn new<P: AsRef<Path>>(
        file_path: P,
        min_level: LogLevel,
        structured: bool,
    ) -> Result<Self, std::io::Error> {
        let path = file_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            file_path: path,
            min_level,
            structured,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let output = if self.structured {
            event.format_json().unwrap_or_else(|_| event.format())
        } else {
            event.format()
        };

        // Write failures are dropped; logging them would recurse
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
        {
            use std::io::Write;
            let _ = writeln!(file, "{}", output);
        }
    }
}

/// Fans one event out to several loggers
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory_logger = Arc::new(MemoryLogger::new());
        self.add_logger(memory_logger.clone());
        (self, memory_logger)
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            for logger in &self.loggers {
                logger.log(event);
            }
        }
    }
}

/// Memory-backed logger for tests
pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(codes::lexical::INVALID_CHARACTER, "Bad '$'"));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::INVALID_CHARACTER));

        let summary = logger.get_summary();
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.error_count, 1);
        assert!(!summary.has_critical_errors());

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_multi_logger_reaches_memory() {
        let (multi, memory) = MultiLogger::new(LogLevel::Debug).with_memory();
        multi.log(&LogEvent::info("Test message"));
        assert_eq!(memory.event_count(), 1);
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = create_test_logger();
        let service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");

        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
    }

    #[test]
    fn test_expression_filtering_and_categories() {
        let logger = create_test_logger();
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_event(
            LogEvent::error(codes::compile::UNKNOWN_FUNCTION, "Unknown").with_expression("a"),
        );
        service.log_success_with_context(
            codes::success::COMPILE_COMPLETE,
            "Compiled",
            vec![("expression", "b"), ("filters", "2")],
        );

        assert_eq!(logger.get_events_for_expression("a").len(), 1);
        assert_eq!(logger.get_events_for_expression("b").len(), 1);
        assert_eq!(logger.get_events_by_category("Compile").len(), 1);
        assert!(logger.has_success_with_code(codes::success::COMPILE_COMPLETE));
    }

    #[test]
    fn test_file_logger_appends_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("exprc.log");
        let logger = FileLogger::new(&path, LogLevel::Info, true).unwrap();

        logger.log(&LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "Unexpected ')'"));
        logger.log(&LogEvent::debug("filtered out"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("\"code\":\"E050\""));
    }

    fn file_preferences(path: &Path, console: bool) -> LoggingPreferences {
        LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: console,
            min_log_level: LogLevel::Warning,
            error_target: crate::config::runtime::ErrorTarget::Silent,
            print_grammar_report: false,
            include_expression_context: true,
            log_file: Some(path.to_path_buf()),
        }
    }

    #[test]
    fn test_preferences_route_events_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exprc.log");
        let service = LoggingService::from_preferences(&file_preferences(&path, false));

        service.log_error(codes::compile::UNKNOWN_FUNCTION, "Unknown function:\"nosuch\".");
        service.log_info("below the configured level");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("nosuch"));
    }

    #[test]
    fn test_console_and_file_both_receive_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("exprc.log");
        let service = LoggingService::from_preferences(&file_preferences(&path, true));

        service.log_warning("Grammar report skipped");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Grammar report skipped"));
    }

    #[test]
    fn test_unopenable_log_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let service = LoggingService::from_preferences(&file_preferences(dir.path(), false));
        service.log_error(codes::system::INTERNAL_ERROR, "still fine");
        assert!(service.should_log(LogLevel::Error));
    }
}
