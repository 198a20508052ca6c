//! Tokens of the expression language
//!
//! Punctuation tokens use their own character as the grammar terminal code.
//! Token classes (identifiers, literals, whitespace) use codes above
//! [`EOF_CODE`](expr_grammar::EOF_CODE) so they never collide with a character.

pub mod terminal;
pub mod token;

pub use token::{Token, TokenKind};
