//! Grammar symbols and the dictionary that interns them

pub mod dictionary;
pub mod symbol;

pub use dictionary::Dictionary;
pub use symbol::{Symbol, SymbolId, SymbolKey, SymbolKind, TerminalCode, EOF_CODE};
