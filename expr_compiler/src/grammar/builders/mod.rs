//! Node construction for the parser
//!
//! The parser never builds [`ExprNode`]s directly; it asks an
//! [`ExprNodeFactory`] so embedders can decorate or count nodes.

use super::ast::{ArgsExpr, DbExpr, ExprNode, PathExpr};
use expr_grammar::Span;

/// One constructor per [`ExprNode`] kind
pub trait ExprNodeFactory {
    fn create_binary(&mut self, op: char, left: ExprNode, right: ExprNode, span: Span) -> ExprNode;

    fn create_unary(&mut self, op: char, operand: ExprNode, span: Span) -> ExprNode;

    fn create_index(&mut self, operand: ExprNode, index: i64, span: Span) -> ExprNode;

    fn create_vector(&mut self, components: Vec<ExprNode>, span: Span) -> ExprNode;

    fn create_integer(&mut self, value: i64, span: Span) -> ExprNode;

    fn create_float(&mut self, value: f64, span: Span) -> ExprNode;

    fn create_string(&mut self, value: String, span: Span) -> ExprNode;

    fn create_bool(&mut self, value: bool, span: Span) -> ExprNode;

    fn create_function(&mut self, name: String, args: Option<ArgsExpr>, span: Span) -> ExprNode;

    fn create_var(
        &mut self,
        database: Option<DbExpr>,
        path: PathExpr,
        canonical: bool,
        span: Span,
    ) -> ExprNode;
}

/// Plain tree construction
#[derive(Debug, Default, Clone, Copy)]
pub struct AstFactory;

impl ExprNodeFactory for AstFactory {
    fn create_binary(&mut self, op: char, left: ExprNode, right: ExprNode, span: Span) -> ExprNode {
        ExprNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }
    }

    fn create_unary(&mut self, op: char, operand: ExprNode, span: Span) -> ExprNode {
        ExprNode::Unary {
            op,
            operand: Box::new(operand),
            span,
        }
    }

    fn create_index(&mut self, operand: ExprNode, index: i64, span: Span) -> ExprNode {
        ExprNode::Index {
            operand: Box::new(operand),
            index,
            span,
        }
    }

    fn create_vector(&mut self, components: Vec<ExprNode>, span: Span) -> ExprNode {
        ExprNode::Vector { components, span }
    }

    fn create_integer(&mut self, value: i64, span: Span) -> ExprNode {
        ExprNode::IntegerConst { value, span }
    }

    fn create_float(&mut self, value: f64, span: Span) -> ExprNode {
        ExprNode::FloatConst { value, span }
    }

    fn create_string(&mut self, value: String, span: Span) -> ExprNode {
        ExprNode::StringConst { value, span }
    }

    fn create_bool(&mut self, value: bool, span: Span) -> ExprNode {
        ExprNode::BooleanConst { value, span }
    }

    fn create_function(&mut self, name: String, args: Option<ArgsExpr>, span: Span) -> ExprNode {
        ExprNode::Function { name, args, span }
    }

    fn create_var(
        &mut self,
        database: Option<DbExpr>,
        path: PathExpr,
        canonical: bool,
        span: Span,
    ) -> ExprNode {
        ExprNode::Var {
            database,
            path,
            canonical,
            span,
        }
    }
}
