//! Dataflow filters the compiler wires together
//!
//! Filters are opaque here: the compiler creates one per operator or
//! function, tells it the names of its inputs and output, and chains its
//! input to the previous filter's output. What a filter computes lives
//! outside this crate.

pub mod builtin;
pub mod catalog;
pub mod registry;

pub use builtin::{
    BinaryMathFilter, BinaryOperator, ConstantCreator, ConstantValue, UnaryMinusFilter,
    VectorComposeFilter, VectorDecomposeFilter,
};
pub use catalog::{Arity, CatalogFilter, Category, FunctionEntry, Support};
pub use registry::FilterRegistry;

use crate::grammar::ArgsExpr;
use crate::pipeline::{CompileError, ExprPipelineState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a filter reads from and produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataObject {
    /// The dataset the expression is evaluated against
    Source,
    /// Output of the filter at `stage` (1-based) in the chain
    Output { stage: usize, variable: String },
}

impl DataObject {
    /// Number of filters between the source and this object
    pub fn stage(&self) -> usize {
        match self {
            DataObject::Source => 0,
            DataObject::Output { stage, .. } => *stage,
        }
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            DataObject::Source => None,
            DataObject::Output { variable, .. } => Some(variable),
        }
    }
}

impl fmt::Display for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataObject::Source => write!(f, "source"),
            DataObject::Output { stage, variable } => write!(f, "#{} {}", stage, variable),
        }
    }
}

/// State every filter carries regardless of what it computes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCore {
    input: Option<DataObject>,
    inputs: Vec<String>,
    output_name: String,
}

/// Serializable snapshot of a configured filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRecord {
    pub stage: usize,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub setting: Option<String>,
    pub inputs: Vec<String>,
    pub output: String,
    /// Source text of arguments that were not compiled as variables
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub arguments: Vec<String>,
}

impl fmt::Display for FilterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}  {}", self.stage, self.kind)?;
        if let Some(setting) = &self.setting {
            write!(f, "[{}]", setting)?;
        }
        write!(f, "({}) -> {}", self.inputs.join(", "), self.output)
    }
}

/// The contract between the compiler and a filter
///
/// Implementors provide their kind, access to their [`FilterCore`] and the
/// number of names they consume from the name stack. The provided methods
/// cover input chaining and naming.
pub trait ExpressionFilter: Send + fmt::Debug {
    fn kind(&self) -> &str;

    fn core(&self) -> &FilterCore;

    fn core_mut(&mut self) -> &mut FilterCore;

    /// Names this filter pops from the stack once its arguments are compiled
    fn num_variable_arguments(&self) -> usize;

    /// Compile whichever arguments are variables into `state`
    ///
    /// Every positional argument is treated as a variable unless the filter
    /// says otherwise.
    fn process_arguments(
        &mut self,
        args: Option<&ArgsExpr>,
        state: &mut ExprPipelineState,
        registry: &FilterRegistry,
    ) -> Result<(), CompileError> {
        if let Some(args) = args {
            for expr in args.args.iter().filter_map(|arg| arg.expr()) {
                crate::pipeline::compile_node(expr, state, registry)?;
            }
        }
        Ok(())
    }

    /// Mode the filter was created in, such as `min` for a min/max filter
    fn setting(&self) -> Option<&str> {
        None
    }

    /// Argument text the filter keeps for itself
    fn extra_arguments(&self) -> &[String] {
        &[]
    }

    fn set_input(&mut self, input: DataObject) {
        self.core_mut().input = Some(input);
    }

    fn input(&self) -> Option<&DataObject> {
        self.core().input.as_ref()
    }

    /// The data object this filter produces once its input is set
    fn output(&self) -> DataObject {
        let stage = self.input().map_or(0, DataObject::stage) + 1;
        DataObject::Output {
            stage,
            variable: self.output_variable_name().to_string(),
        }
    }

    fn add_input_variable_name(&mut self, name: &str) {
        self.core_mut().inputs.push(name.to_string());
    }

    fn input_variable_names(&self) -> &[String] {
        &self.core().inputs
    }

    fn set_output_variable_name(&mut self, name: &str) {
        self.core_mut().output_name = name.to_string();
    }

    fn output_variable_name(&self) -> &str {
        &self.core().output_name
    }

    fn record(&self) -> FilterRecord {
        FilterRecord {
            stage: self.output().stage(),
            kind: self.kind().to_string(),
            setting: self.setting().map(str::to_string),
            inputs: self.input_variable_names().to_vec(),
            output: self.output_variable_name().to_string(),
            arguments: self.extra_arguments().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_follows_input_stage() {
        let mut filter = UnaryMinusFilter::new();
        filter.set_output_variable_name("-(a)");
        assert_eq!(filter.output().stage(), 1);

        filter.set_input(DataObject::Output {
            stage: 4,
            variable: "b".into(),
        });
        assert_eq!(
            filter.output(),
            DataObject::Output {
                stage: 5,
                variable: "-(a)".into()
            }
        );
    }

    #[test]
    fn record_lists_inputs_in_order() {
        let mut filter = BinaryMathFilter::new(BinaryOperator::Add);
        filter.set_input(DataObject::Source);
        filter.add_input_variable_name("a");
        filter.add_input_variable_name("b");
        filter.set_output_variable_name("a+b");
        let record = filter.record();
        assert_eq!(record.kind, "BinaryAdd");
        assert_eq!(record.inputs, vec!["a", "b"]);
        assert_eq!(record.to_string(), "  1  BinaryAdd(a, b) -> a+b");
    }

    #[test]
    fn record_json_omits_empty_fields() {
        let mut filter = UnaryMinusFilter::new();
        filter.set_output_variable_name("-(a)");
        let json = serde_json::to_string(&filter.record()).unwrap();
        assert!(!json.contains("setting"));
        assert!(!json.contains("arguments"));
    }
}
