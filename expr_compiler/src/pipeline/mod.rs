//! Expression text to filter pipeline
//!
//! Parsing produces an [`ExprNode`] tree; [`compile_node`] walks it and
//! appends filters to an [`ExprPipelineState`]. [`ExpressionCompiler`] runs
//! both stages and packages the result as a [`CompiledExpression`].

mod compile;
mod error;
mod output;
mod state;
mod stats;

pub use compile::compile_node;
pub use error::{CompileError, ErrorKind, ExpressionError};
pub use output::CompiledExpression;
pub use state::ExprPipelineState;
pub use stats::{CompileStats, PipelineStats};

use crate::filters::FilterRegistry;
use crate::grammar::{AstFactory, ExprNode, ExprNodeFactory};
use crate::logging::codes;
use crate::syntax::{normalize, ErrorSink, ExprParser, SyntaxError};
use crate::{log_debug, log_error, log_success};
use chrono::Utc;

/// Compile a parsed tree into a fresh pipeline state
///
/// The root must leave exactly one name behind: the expression's output.
pub fn compile_tree(
    tree: &ExprNode,
    registry: &FilterRegistry,
) -> Result<ExprPipelineState, CompileError> {
    let mut state = ExprPipelineState::new();
    compile_node(tree, &mut state, registry)?;
    if state.num_names() != 1 {
        return Err(CompileError::StackImbalance {
            node: tree.kind_name().to_string(),
            expected: 1,
            found: state.num_names(),
            span: Some(tree.span()),
        });
    }
    Ok(state)
}

/// Parser and registry reused across compiles
pub struct ExpressionCompiler<F = AstFactory> {
    parser: ExprParser<F>,
    registry: &'static FilterRegistry,
}

impl ExpressionCompiler<AstFactory> {
    pub fn new() -> Result<Self, ExpressionError> {
        Ok(Self::with_parts(ExprParser::new()?, FilterRegistry::global()))
    }
}

impl<F: ExprNodeFactory> ExpressionCompiler<F> {
    pub fn with_parts(parser: ExprParser<F>, registry: &'static FilterRegistry) -> Self {
        Self { parser, registry }
    }

    pub fn registry(&self) -> &'static FilterRegistry {
        self.registry
    }

    pub fn compile(&mut self, text: &str) -> Result<CompiledExpression, ExpressionError> {
        let result = self.compile_quietly(text);
        match &result {
            Ok(compiled) => log_success!(
                codes::success::COMPILE_COMPLETE,
                "Expression compiled",
                "output" => &compiled.output_variable,
                "filters" => compiled.filter_count(),
                "duration_us" => compiled.stats.total_micros()
            ),
            Err(error) => log_expression_error(error),
        }
        result
    }

    /// Compile, sending a failure to `sink` as well as returning it
    pub fn compile_reporting(
        &mut self,
        text: &str,
        sink: &mut dyn ErrorSink,
    ) -> Result<CompiledExpression, ExpressionError> {
        self.compile(text).map_err(|error| {
            sink.report(error.diagnostic(&normalize(text)));
            error
        })
    }

    fn compile_quietly(&mut self, text: &str) -> Result<CompiledExpression, ExpressionError> {
        let started = Utc::now();
        let tree = self.parser.parse(text)?;
        let parsed = Utc::now();
        log_debug!("Parsed expression", "root" => tree.kind_name());

        let state = compile_tree(&tree, self.registry)?;
        let finished = Utc::now();

        let stats = CompileStats {
            filter_count: state.filters().len(),
            peak_name_depth: state.peak_depth(),
            parse_micros: (parsed - started).num_microseconds().unwrap_or(i64::MAX),
            compile_micros: (finished - parsed).num_microseconds().unwrap_or(i64::MAX),
        };
        Ok(CompiledExpression {
            source: text.to_string(),
            output_variable: state.top_name().unwrap_or_default().to_string(),
            filters: state.records(),
            data_object: state.data_object().clone(),
            stats,
        })
    }
}

fn log_expression_error(error: &ExpressionError) {
    // The scanner logs its own failures
    if matches!(error, ExpressionError::Syntax(SyntaxError::Lexical(_))) {
        return;
    }
    let message = error.to_string();
    match error.span() {
        Some(span) => log_error!(error.error_code(), &message, span = span,
            "kind" => error.kind().as_str()),
        None => log_error!(error.error_code(), &message, "kind" => error.kind().as_str()),
    }
}

/// Compile one expression with the shared grammar and registry
pub fn compile_expression(text: &str) -> Result<CompiledExpression, ExpressionError> {
    ExpressionCompiler::new()?.compile(text)
}

pub fn compile_expression_reporting(
    text: &str,
    sink: &mut dyn ErrorSink,
) -> Result<CompiledExpression, ExpressionError> {
    ExpressionCompiler::new()?.compile_reporting(text, sink)
}
