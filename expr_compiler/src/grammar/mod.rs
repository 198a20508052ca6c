//! Expression grammar, syntax tree and node factory

pub mod ast;
pub mod builders;
pub mod definition;
pub mod nonterminals;
mod prebuilt;
pub mod rules;

use crate::tokens::terminal;

pub use ast::*;
pub use builders::{AstFactory, ExprNodeFactory};
pub use definition::{
    configure_expression_grammar, expression_grammar, grammar_error_code, grammar_from_tables,
};
pub use nonterminals::NonTerminal;
pub use rules::{build_expression_grammar, GRAMMAR_NAME};
