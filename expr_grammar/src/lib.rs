//! LR(1) grammar engine
//!
//! Build a [`Grammar`] from interned symbols and [`Rule`]s, declare operator
//! precedence and associativity, then [`Grammar::configure`] it into an
//! immutable automaton. A configured grammar can be shared freely between
//! threads and drives any number of [`Parser`]s, each of which hands its
//! reductions to a grammar-specific [`Reduction`].

pub mod grammar;
pub mod items;
pub mod parser;
pub mod rules;
pub mod state;
pub mod symbols;
pub mod utils;

pub use grammar::{
    ConfigureReport, Conflict, ConflictKind, Grammar, GrammarError, GrammarResult,
    GrammarTables, Resolution, ResolutionReason, StateTable, START_SYMBOL, STATES_PER_CHUNK,
};
pub use items::{ConfiguratingItem, ConfiguratingSet};
pub use parser::{Element, GrammarToken, ParseError, Parser, Reduction};
pub use rules::{Associativity, Rule};
pub use state::State;
pub use symbols::{Dictionary, Symbol, SymbolId, SymbolKey, SymbolKind, TerminalCode, EOF_CODE};
pub use utils::{Position, Span};
