//! Filters created directly by operators and constants

use super::{ExpressionFilter, FilterCore};
use std::fmt;

/// Numeric value baked into a constant filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Float(f64),
}

impl ConstantValue {
    /// Variable name of the constant: `'%d'` for integers, `'%e'` for floats
    pub fn variable_name(&self) -> String {
        match self {
            ConstantValue::Integer(value) => format!("'{}'", value),
            ConstantValue::Float(value) => format!("'{}'", c_exponent(*value)),
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Integer(value) => write!(f, "{}", value),
            ConstantValue::Float(value) => write!(f, "{}", c_exponent(*value)),
        }
    }
}

/// `printf("%e")` formatting: six fraction digits, signed two-digit exponent
fn c_exponent(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            String::from("nan")
        } else if value > 0.0 {
            String::from("inf")
        } else {
            String::from("-inf")
        };
    }
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

#[derive(Debug, Clone)]
pub struct ConstantCreator {
    core: FilterCore,
    value: ConstantValue,
}

impl ConstantCreator {
    pub fn new(value: ConstantValue) -> Self {
        Self {
            core: FilterCore::default(),
            value,
        }
    }

    pub fn value(&self) -> ConstantValue {
        self.value
    }
}

impl ExpressionFilter for ConstantCreator {
    fn kind(&self) -> &str {
        "ConstantCreator"
    }

    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn num_variable_arguments(&self) -> usize {
        0
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnaryMinusFilter {
    core: FilterCore,
}

impl UnaryMinusFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionFilter for UnaryMinusFilter {
    fn kind(&self) -> &str {
        "UnaryMinus"
    }

    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn num_variable_arguments(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    And,
    Modulo,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 7] = [
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Power,
        BinaryOperator::And,
        BinaryOperator::Modulo,
    ];

    pub fn from_char(op: char) -> Option<Self> {
        match op {
            '+' => Some(BinaryOperator::Add),
            '-' => Some(BinaryOperator::Subtract),
            '*' => Some(BinaryOperator::Multiply),
            '/' => Some(BinaryOperator::Divide),
            '^' => Some(BinaryOperator::Power),
            '&' => Some(BinaryOperator::And),
            '%' => Some(BinaryOperator::Modulo),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
            BinaryOperator::Power => '^',
            BinaryOperator::And => '&',
            BinaryOperator::Modulo => '%',
        }
    }

    pub fn filter_kind(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "BinaryAdd",
            BinaryOperator::Subtract => "BinarySubtract",
            BinaryOperator::Multiply => "BinaryMultiply",
            BinaryOperator::Divide => "BinaryDivide",
            BinaryOperator::Power => "BinaryPower",
            BinaryOperator::And => "BinaryAnd",
            BinaryOperator::Modulo => "BinaryModulo",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryMathFilter {
    core: FilterCore,
    operator: BinaryOperator,
}

impl BinaryMathFilter {
    pub fn new(operator: BinaryOperator) -> Self {
        Self {
            core: FilterCore::default(),
            operator,
        }
    }

    pub fn operator(&self) -> BinaryOperator {
        self.operator
    }
}

impl ExpressionFilter for BinaryMathFilter {
    fn kind(&self) -> &str {
        self.operator.filter_kind()
    }

    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn num_variable_arguments(&self) -> usize {
        2
    }
}

/// Extracts one component of a vector or array
#[derive(Debug, Clone)]
pub struct VectorDecomposeFilter {
    core: FilterCore,
    component: i64,
}

impl VectorDecomposeFilter {
    pub fn new(component: i64) -> Self {
        Self {
            core: FilterCore::default(),
            component,
        }
    }

    pub fn component(&self) -> i64 {
        self.component
    }
}

impl ExpressionFilter for VectorDecomposeFilter {
    fn kind(&self) -> &str {
        "VectorDecompose"
    }

    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn num_variable_arguments(&self) -> usize {
        1
    }
}

/// Builds a 2 or 3 component vector
#[derive(Debug, Clone)]
pub struct VectorComposeFilter {
    core: FilterCore,
    width: usize,
}

impl VectorComposeFilter {
    pub fn new(width: usize) -> Self {
        Self {
            core: FilterCore::default(),
            width,
        }
    }
}

impl ExpressionFilter for VectorComposeFilter {
    fn kind(&self) -> &str {
        "VectorCompose"
    }

    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn num_variable_arguments(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_names_use_c_exponent_form() {
        assert_eq!(ConstantValue::Float(3.5).variable_name(), "'3.500000e+00'");
        assert_eq!(ConstantValue::Float(0.00125).variable_name(), "'1.250000e-03'");
        assert_eq!(ConstantValue::Float(-2.0e120).variable_name(), "'-2.000000e+120'");
        assert_eq!(ConstantValue::Float(0.0).variable_name(), "'0.000000e+00'");
    }

    #[test]
    fn integer_names_are_decimal() {
        assert_eq!(ConstantValue::Integer(-3).variable_name(), "'-3'");
        assert_eq!(ConstantValue::Integer(42).variable_name(), "'42'");
    }

    #[test]
    fn operators_round_trip_through_symbols() {
        for operator in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_char(operator.symbol()), Some(operator));
        }
        assert_eq!(BinaryOperator::from_char('|'), None);
    }

    #[test]
    fn vector_compose_consumes_its_width() {
        assert_eq!(VectorComposeFilter::new(3).num_variable_arguments(), 3);
        assert_eq!(VectorDecomposeFilter::new(1).component(), 1);
    }
}
