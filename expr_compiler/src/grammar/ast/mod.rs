//! Expression syntax tree

pub mod nodes;

pub use nodes::{
    ArgExpr, ArgValue, ArgsExpr, DbExpr, ExprNode, ListElemExpr, ListExpr, MachExpr, PathExpr,
    TimeExpr, TimeFormat,
};
