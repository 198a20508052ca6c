// Internal modules
pub mod batch;
pub mod config;
pub mod definitions;
pub mod filters;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use definitions::{load_definitions, Definition, DefinitionSet};
pub use filters::{ExpressionFilter, FilterRegistry};
pub use grammar::ExprNode;
pub use pipeline::{
    compile_expression, compile_node, CompileError, CompiledExpression, ExprPipelineState,
    ExpressionCompiler, ExpressionError,
};
pub use syntax::ExprParser;
