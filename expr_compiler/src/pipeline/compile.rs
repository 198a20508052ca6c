//! Tree to filter chain
//!
//! Children compile first and each leaves exactly one name on the stack.
//! The parent pops those names, wires them into its filter as inputs and
//! pushes the name of its own output.

use super::{CompileError, ExprPipelineState};
use crate::filters::{
    BinaryMathFilter, BinaryOperator, ConstantCreator, ConstantValue, ExpressionFilter,
    FilterRegistry, UnaryMinusFilter, VectorComposeFilter, VectorDecomposeFilter,
};
use crate::grammar::{ArgsExpr, ExprNode};
use expr_grammar::Span;

pub fn compile_node(
    node: &ExprNode,
    state: &mut ExprPipelineState,
    registry: &FilterRegistry,
) -> Result<(), CompileError> {
    state.enter_node(node.span())?;
    let result = compile_children(node, state, registry);
    state.leave_node();
    result
}

fn compile_children(
    node: &ExprNode,
    state: &mut ExprPipelineState,
    registry: &FilterRegistry,
) -> Result<(), CompileError> {
    match node {
        ExprNode::IntegerConst { value, .. } => {
            compile_constant(ConstantValue::Integer(*value), state)
        }
        ExprNode::FloatConst { value, .. } => compile_constant(ConstantValue::Float(*value), state),
        ExprNode::StringConst { span, .. } => Err(CompileError::UnsupportedConstant {
            kind: "String",
            span: *span,
        }),
        ExprNode::BooleanConst { span, .. } => Err(CompileError::UnsupportedConstant {
            kind: "Bool",
            span: *span,
        }),
        ExprNode::Unary { op, operand, span } => {
            compile_node(operand, state, registry)?;
            if *op != '-' {
                return Err(CompileError::UnknownUnaryOperator { op: *op, span: *span });
            }
            let input = pop_operand(state, "UnaryExpr", 1, *span)?;
            let mut filter = UnaryMinusFilter::new();
            filter.add_input_variable_name(&input);
            finish(state, Box::new(filter), format!("{}({})", op, input))
        }
        ExprNode::Binary {
            op,
            left,
            right,
            span,
        } => {
            compile_node(left, state, registry)?;
            compile_node(right, state, registry)?;
            let operator = BinaryOperator::from_char(*op)
                .ok_or(CompileError::UnknownBinaryOperator { op: *op, span: *span })?;
            let right_name = pop_operand(state, "BinaryExpr", 2, *span)?;
            let left_name = pop_operand(state, "BinaryExpr", 2, *span)?;
            let mut filter = BinaryMathFilter::new(operator);
            filter.add_input_variable_name(&left_name);
            filter.add_input_variable_name(&right_name);
            finish(
                state,
                Box::new(filter),
                format!("{}{}{}", left_name, op, right_name),
            )
        }
        ExprNode::Index {
            operand,
            index,
            span,
        } => {
            compile_node(operand, state, registry)?;
            let input = pop_operand(state, "IndexExpr", 1, *span)?;
            let mut filter = VectorDecomposeFilter::new(*index);
            filter.add_input_variable_name(&input);
            finish(state, Box::new(filter), format!("{}[{}]", input, index))
        }
        ExprNode::Vector { components, span } => {
            for component in components {
                compile_node(component, state, registry)?;
            }
            let mut inputs = Vec::with_capacity(components.len());
            for _ in components {
                inputs.push(pop_operand(state, "VectorExpr", components.len(), *span)?);
            }
            inputs.reverse();
            let mut filter = VectorComposeFilter::new(inputs.len());
            for input in &inputs {
                filter.add_input_variable_name(input);
            }
            finish(state, Box::new(filter), format!("{{{}}}", inputs.join(",")))
        }
        ExprNode::Function { name, args, span } => {
            compile_function(name, args.as_ref(), *span, state, registry)
        }
        ExprNode::Var { path, .. } => state.push_name(path.full_path.clone()),
    }
}

fn compile_constant(value: ConstantValue, state: &mut ExprPipelineState) -> Result<(), CompileError> {
    finish(
        state,
        Box::new(ConstantCreator::new(value)),
        value.variable_name(),
    )
}

fn compile_function(
    name: &str,
    args: Option<&ArgsExpr>,
    span: Span,
    state: &mut ExprPipelineState,
    registry: &FilterRegistry,
) -> Result<(), CompileError> {
    let mut filter = registry.create(name, span)?;
    // Until the arguments are known the function name stands in
    filter.set_output_variable_name(name);

    let depth = state.num_names();
    filter.process_arguments(args, state, registry)?;
    let pushed = state.num_names().saturating_sub(depth);
    let expected = filter.num_variable_arguments();
    if pushed < expected {
        return Err(CompileError::ArgumentUnderflow {
            function: name.to_string(),
            expected,
            available: pushed,
            span,
        });
    }
    if pushed > expected {
        return Err(CompileError::StackImbalance {
            node: format!("arguments of {}", name),
            expected,
            found: pushed,
            span: Some(span),
        });
    }

    let mut inputs = Vec::with_capacity(expected);
    for _ in 0..expected {
        inputs.push(pop_operand(state, name, expected, span)?);
    }
    inputs.reverse();
    for input in &inputs {
        filter.add_input_variable_name(input);
    }

    let mut parts = inputs;
    if let Some(args) = args {
        parts.extend(args.args.iter().skip(expected).map(|arg| arg.text.clone()));
    }
    finish(state, filter, format!("{}({})", name, parts.join(",")))
}

fn pop_operand(
    state: &mut ExprPipelineState,
    node: &str,
    expected: usize,
    span: Span,
) -> Result<String, CompileError> {
    state.pop_name().ok_or_else(|| CompileError::StackImbalance {
        node: node.to_string(),
        expected,
        found: 0,
        span: Some(span),
    })
}

/// Name the filter's output, push the name and chain the filter
fn finish(
    state: &mut ExprPipelineState,
    mut filter: Box<dyn ExpressionFilter>,
    output: String,
) -> Result<(), CompileError> {
    filter.set_output_variable_name(&output);
    state.push_name(output)?;
    state.append(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::syntax::MAX_TREE_DEPTH;
    use crate::grammar::PathExpr;
    use crate::syntax::parse;
    use assert_matches::assert_matches;

    fn compile(text: &str) -> Result<ExprPipelineState, CompileError> {
        let tree = parse(text).unwrap();
        let mut state = ExprPipelineState::new();
        compile_node(&tree, &mut state, FilterRegistry::global())?;
        Ok(state)
    }

    fn outputs(state: &ExprPipelineState) -> Vec<String> {
        state
            .filters()
            .iter()
            .map(|f| f.output_variable_name().to_string())
            .collect()
    }

    #[test]
    fn product_binds_before_sum() {
        let state = compile("a+b*c").unwrap();
        assert_eq!(outputs(&state), vec!["b*c", "a+b*c"]);
        let add = &state.filters()[1];
        assert_eq!(add.kind(), "BinaryAdd");
        assert_eq!(add.input_variable_names(), ["a", "b*c"]);
        assert_eq!(state.top_name(), Some("a+b*c"));
        assert_eq!(state.num_names(), 1);
    }

    #[test]
    fn subtraction_is_left_associative() {
        let state = compile("a-b-c").unwrap();
        assert_eq!(outputs(&state), vec!["a-b", "a-b-c"]);
        assert_eq!(state.filters()[1].input_variable_names(), ["a-b", "c"]);
    }

    #[test]
    fn constants_are_named_by_value() {
        let state = compile("3.5").unwrap();
        assert_eq!(outputs(&state), vec!["'3.500000e+00'"]);
        assert_eq!(state.filters()[0].kind(), "ConstantCreator");

        let state = compile("x*2").unwrap();
        assert_eq!(outputs(&state), vec!["'2'", "x*'2'"]);
    }

    #[test]
    fn negative_literals_fold_into_constants() {
        let state = compile("-3").unwrap();
        assert_eq!(outputs(&state), vec!["'-3'"]);
        let state = compile("-3.5").unwrap();
        assert_eq!(outputs(&state), vec!["'-3.500000e+00'"]);
    }

    #[test]
    fn unary_minus_wraps_its_operand() {
        let state = compile("-a").unwrap();
        assert_eq!(outputs(&state), vec!["-(a)"]);
        assert_eq!(state.filters()[0].kind(), "UnaryMinus");
    }

    #[test]
    fn strings_and_booleans_are_not_constants_here() {
        assert_matches!(
            compile("\"hello\""),
            Err(CompileError::UnsupportedConstant { kind: "String", .. })
        );
        assert_matches!(
            compile("a + true"),
            Err(CompileError::UnsupportedConstant { kind: "Bool", .. })
        );
    }

    #[test]
    fn vector_inputs_keep_source_order() {
        let state = compile("{a,b,c}").unwrap();
        let compose = &state.filters()[0];
        assert_eq!(compose.kind(), "VectorCompose");
        assert_eq!(compose.input_variable_names(), ["a", "b", "c"]);
        assert_eq!(compose.output_variable_name(), "{a,b,c}");
        assert_eq!(compose.num_variable_arguments(), 3);
    }

    #[test]
    fn index_names_the_component() {
        let state = compile("velocity[1]").unwrap();
        assert_eq!(outputs(&state), vec!["velocity[1]"]);
        assert_eq!(state.filters()[0].kind(), "VectorDecompose");
    }

    #[test]
    fn variables_push_without_filters() {
        let state = compile("<mesh/coords>").unwrap();
        assert!(state.filters().is_empty());
        assert_eq!(state.top_name(), Some("mesh/coords"));
    }

    #[test]
    fn missing_argument_names_the_function() {
        let err = compile("recenter()").unwrap_err();
        assert_matches!(
            &err,
            CompileError::ArgumentUnderflow { function, expected: 1, available: 0, .. }
                if function == "recenter"
        );
        assert!(err.to_string().contains("\"recenter\""));
    }

    #[test]
    fn non_variable_arguments_keep_their_text() {
        let one = compile("val4mat(x,\"1\")").unwrap();
        let two = compile("val4mat(x,\"2\")").unwrap();
        assert_eq!(one.top_name(), Some("val4mat(x,\"1\")"));
        assert_eq!(two.top_name(), Some("val4mat(x,\"2\")"));
        let filter = &one.filters()[0];
        assert_eq!(filter.input_variable_names(), ["x"]);
        assert_eq!(filter.extra_arguments(), ["\"1\""]);
    }

    #[test]
    fn variadic_functions_take_every_leading_expression() {
        let state = compile("max(a, b*2, c)").unwrap();
        let max = state.filters().last().unwrap();
        assert_eq!(max.kind(), "MinMax");
        assert_eq!(max.setting(), Some("max"));
        assert_eq!(max.input_variable_names(), ["a", "b*'2'", "c"]);
        assert_eq!(max.output_variable_name(), "max(a,b*'2',c)");
    }

    #[test]
    fn alias_is_kept_in_the_output_name() {
        let state = compile("minimum(a, b)").unwrap();
        assert_eq!(state.top_name(), Some("minimum(a,b)"));
    }

    #[test]
    fn list_in_variable_position_is_rejected() {
        assert_matches!(
            compile("recenter([1,2])"),
            Err(CompileError::ListAsVariable { function, .. }) if function == "recenter"
        );
    }

    #[test]
    fn unknown_function_is_reported() {
        assert_matches!(
            compile("a + nosuch(b)"),
            Err(CompileError::UnknownFunction { name, .. }) if name == "nosuch"
        );
    }

    #[test]
    fn python_filters_are_unavailable() {
        assert_matches!(
            compile("python(a)"),
            Err(CompileError::UnsupportedFilter { function, .. }) if function == "python"
        );
    }

    #[test]
    fn nested_functions_chain_data_objects() {
        let state = compile("sqrt(abs(a)) + 1").unwrap();
        assert_eq!(outputs(&state), vec!["abs(a)", "sqrt(abs(a))", "'1'", "sqrt(abs(a))+'1'"]);
        for (stage, filter) in state.filters().iter().enumerate() {
            assert_eq!(filter.output().stage(), stage + 1);
        }
    }

    #[test]
    fn hand_built_trees_are_depth_limited() {
        let mut tree = ExprNode::Var {
            database: None,
            path: PathExpr::new("a", Span::default()),
            canonical: true,
            span: Span::default(),
        };
        for _ in 0..MAX_TREE_DEPTH {
            tree = ExprNode::Unary {
                op: '-',
                operand: Box::new(tree),
                span: Span::default(),
            };
        }
        let mut state = ExprPipelineState::new();
        let err = compile_node(&tree, &mut state, FilterRegistry::global()).unwrap_err();
        assert_matches!(
            err,
            CompileError::LimitExceeded { limit: "nested expression levels", max, .. }
                if max == MAX_TREE_DEPTH
        );
    }

    #[test]
    fn nesting_unwinds_after_each_compile() {
        let mut state = ExprPipelineState::new();
        let registry = FilterRegistry::global();
        for text in ["-(-(-a))", "{a,b}[0]"] {
            compile_node(&parse(text).unwrap(), &mut state, registry).unwrap();
        }
        assert_eq!(state.num_names(), 2);
    }
}
