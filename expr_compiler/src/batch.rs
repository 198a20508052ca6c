//! Batch compilation of named expressions
//!
//! Definitions are handed out to a bounded set of worker threads through a
//! shared counter. Every worker owns its parser; the configured grammar and
//! the filter registry are shared. Results come back in definition order.

use crate::config::compile_time::batch_processing::{
    MAX_EXPRESSIONS_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::config::BatchPreferences;
use crate::definitions::{Definition, DefinitionError, DefinitionSet};
use crate::logging::{self, codes, Code};
use crate::pipeline::{CompiledExpression, ExpressionCompiler, ExpressionError, PipelineStats};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    /// Stop handing out work after the first failure
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from(&BatchPreferences::default())
    }
}

impl From<&BatchPreferences> for BatchConfig {
    fn from(preferences: &BatchPreferences) -> Self {
        Self {
            max_threads: preferences.threads.clamp(1, MAX_WORKER_THREADS),
            fail_fast: preferences.fail_fast,
        }
    }
}

#[derive(Debug)]
pub struct BatchResults {
    pub successful: Vec<(String, CompiledExpression)>,
    pub failed: Vec<(String, ExpressionError)>,
    /// Definitions never compiled because of fail-fast
    pub skipped: usize,
    pub expressions_total: usize,
    pub processing_duration: chrono::Duration,
    pub stats: PipelineStats,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            skipped: 0,
            expressions_total: 0,
            processing_duration: chrono::Duration::zero(),
            stats: PipelineStats::default(),
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn processed(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.processed() == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.processed() as f64
        }
    }

    pub fn add_success(&mut self, name: String, compiled: CompiledExpression) {
        self.stats.record(&compiled.stats);
        self.successful.push((name, compiled));
    }

    pub fn add_failure(&mut self, name: String, error: ExpressionError) {
        self.stats.record_failure();
        self.failed.push((name, error));
    }

    pub fn get(&self, name: &str) -> Option<&CompiledExpression> {
        self.successful
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, compiled)| compiled)
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Batch compile finished: {} of {} expressions processed, {} compiled ({:.1}%), {} failed",
            self.processed(),
            self.expressions_total,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
        );
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        summary.push_str(&format!(
            ", {} ms",
            self.processing_duration.num_milliseconds()
        ));
        summary
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Too many expressions in one batch: {count} (max: {max})")]
    TooManyExpressions { count: usize, max: usize },

    #[error(transparent)]
    Definitions(#[from] DefinitionError),

    #[error("Could not start the expression compiler: {0}")]
    Initialization(#[from] ExpressionError),

    #[error("Batch worker failed: {message}")]
    WorkerFailed { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::TooManyExpressions { .. } => codes::batch::BATCH_TOO_LARGE,
            BatchError::Definitions(error) => error.error_code(),
            BatchError::Initialization(_) => codes::system::INITIALIZATION_FAILURE,
            BatchError::WorkerFailed { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

type Outcome = (usize, Result<CompiledExpression, ExpressionError>);

/// Work queue shared by the workers of one batch
struct Queue<'a> {
    definitions: &'a [Definition],
    next: AtomicUsize,
    stop: AtomicBool,
    fail_fast: bool,
}

impl Queue<'_> {
    fn run_worker(&self) -> Result<Vec<Outcome>, ExpressionError> {
        let mut compiler = ExpressionCompiler::new()?;
        let mut outcomes = Vec::new();
        loop {
            if self.stop.load(Ordering::Acquire) {
                break;
            }
            let index = self.next.fetch_add(1, Ordering::AcqRel);
            let Some(definition) = self.definitions.get(index) else {
                break;
            };
            let result = logging::with_expression_context(&definition.name, index, || {
                compiler.compile(&definition.expression)
            });
            if let Err(error) = &result {
                crate::log_error!(codes::batch::EXPRESSION_FAILED, "Expression failed to compile",
                    "expression" => &definition.name,
                    "code" => error.error_code()
                );
                if self.fail_fast {
                    self.stop.store(true, Ordering::Release);
                }
            }
            outcomes.push((index, result));
        }
        Ok(outcomes)
    }
}

/// Compile every definition, in parallel when more than one thread is allowed
pub fn compile_definitions(
    definitions: &DefinitionSet,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let started = Utc::now();
    let list: Vec<Definition> = definitions.iter().cloned().collect();
    if list.len() > MAX_EXPRESSIONS_PER_BATCH {
        return Err(BatchError::TooManyExpressions {
            count: list.len(),
            max: MAX_EXPRESSIONS_PER_BATCH,
        });
    }

    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS).min(list.len().max(1));
    crate::log_info!("Starting batch compile",
        "expressions" => list.len(),
        "threads" => threads,
        "fail_fast" => config.fail_fast
    );

    let queue = Queue {
        definitions: &list,
        next: AtomicUsize::new(0),
        stop: AtomicBool::new(false),
        fail_fast: config.fail_fast,
    };

    let mut outcomes = if threads == 1 {
        queue.run_worker()?
    } else {
        thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| scope.spawn(|| queue.run_worker()))
                .collect();
            let mut outcomes = Vec::new();
            for handle in handles {
                let worker = handle.join().map_err(|_| BatchError::WorkerFailed {
                    message: String::from("worker thread panicked"),
                })?;
                outcomes.extend(worker?);
            }
            Ok::<_, BatchError>(outcomes)
        })?
    };
    outcomes.sort_by_key(|(index, _)| *index);

    let mut results = BatchResults::new();
    results.expressions_total = list.len();
    for (index, result) in outcomes {
        let name = list[index].name.clone();
        match result {
            Ok(compiled) => results.add_success(name, compiled),
            Err(error) => results.add_failure(name, error),
        }
    }
    results.skipped = list.len() - results.processed();
    results.processing_duration = Utc::now() - started;

    crate::log_performance!(
        codes::success::BATCH_COMPLETE,
        "Batch compile finished",
        duration = results.processing_duration,
        "compiled" => results.success_count(),
        "failed" => results.failure_count(),
        "skipped" => results.skipped
    );

    Ok(results)
}

/// Load a definition file and compile it
pub fn compile_file<P: AsRef<std::path::Path>>(
    path: P,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let definitions = crate::definitions::load_definitions(path)?;
    compile_definitions(&definitions, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::syntax::MAX_TREE_DEPTH;
    use crate::definitions::parse_definitions;
    use crate::syntax::SyntaxError;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn config(threads: usize, fail_fast: bool) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            fail_fast,
        }
    }

    const DEFINITIONS: &str = "\
speed = magnitude(velocity)
ke = 0.5 * density * speed^2
bad = nosuch(a)
neg = -pressure
vec = {a, b, c}
";

    #[test]
    fn parallel_results_keep_definition_order() {
        let set = parse_definitions(DEFINITIONS).unwrap();
        let results = compile_definitions(&set, &config(4, false)).unwrap();
        let names: Vec<_> = results.successful.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["speed", "ke", "neg", "vec"]);
        assert_eq!(results.failure_count(), 1);
        assert_matches!(
            &results.failed[0],
            (name, ExpressionError::Semantic(_)) if name == "bad"
        );
        assert_eq!(results.skipped, 0);
        assert_eq!(results.get("vec").unwrap().output_variable, "{a,b,c}");
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let set = parse_definitions(DEFINITIONS).unwrap();
        let one = compile_definitions(&set, &config(1, false)).unwrap();
        let many = compile_definitions(&set, &config(3, false)).unwrap();
        for ((a, x), (b, y)) in one.successful.iter().zip(many.successful.iter()) {
            assert_eq!(a, b);
            assert_eq!(x.filters, y.filters);
        }
        assert_eq!(one.stats.total_filters, many.stats.total_filters);
    }

    #[test]
    fn fail_fast_stops_sequential_batch() {
        let set = parse_definitions("a = x+\nb = y\nc = z").unwrap();
        let results = compile_definitions(&set, &config(1, true)).unwrap();
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.success_count(), 0);
        assert_eq!(results.skipped, 2);
        assert!(results.summary().contains("2 skipped"));
    }

    #[test]
    fn empty_batch_is_fine() {
        let results = compile_definitions(&DefinitionSet::new(), &config(4, false)).unwrap();
        assert_eq!(results.processed(), 0);
        assert_eq!(results.success_rate(), 0.0);
    }

    #[test]
    fn compile_file_reads_definitions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "total = a + b").unwrap();
        let results = compile_file(file.path(), &config(2, false)).unwrap();
        assert_eq!(results.success_count(), 1);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "total a + b").unwrap();
        let err = compile_file(bad.path(), &config(2, false)).unwrap_err();
        assert_eq!(err.error_code(), codes::batch::DEFINITION_SYNTAX);
    }

    #[test]
    fn config_respects_thread_limit() {
        let prefs = BatchPreferences {
            threads: MAX_WORKER_THREADS + 10,
            fail_fast: true,
        };
        let config = BatchConfig::from(&prefs);
        assert_eq!(config.max_threads, MAX_WORKER_THREADS);
        assert!(config.fail_fast);
    }

    #[test]
    fn deep_definition_fails_alone() {
        let deep = vec!["a"; MAX_TREE_DEPTH + 10].join("+");
        let text = format!("{}deep = {}\n", DEFINITIONS, deep);
        let set = parse_definitions(&text).unwrap();
        let results = compile_definitions(&set, &config(4, false)).unwrap();
        assert_eq!(results.success_count(), 4);
        assert_eq!(results.failure_count(), 2);
        assert_matches!(
            results.failed.iter().find(|(name, _)| name == "deep"),
            Some((_, ExpressionError::Syntax(SyntaxError::MaxTreeDepth { .. })))
        );
    }
}
