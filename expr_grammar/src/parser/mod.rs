//! Table-driven LR parsing
//!
//! [`Parser`] knows nothing about what is being built: every reduction is
//! handed to a [`Reduction`] implementation that synthesizes a value from
//! the popped tokens and values.

pub mod driver;
pub mod error;

pub use driver::{Element, GrammarToken, Parser, Reduction};
pub use error::ParseError;
