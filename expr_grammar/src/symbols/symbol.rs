use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric class of a terminal. Codes below 256 are single characters,
/// [`EOF_CODE`] marks end of input and larger codes are token classes.
pub type TerminalCode = u32;

/// End-of-input terminal code
pub const EOF_CODE: TerminalCode = 256;

/// Handle to an interned symbol. Two handles from the same dictionary are
/// equal iff they denote the same symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Terminal(TerminalCode),
    NonTerminal,
}

/// An interned grammar symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    id: SymbolId,
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    pub(crate) fn new(id: SymbolId, name: String, kind: SymbolKind) -> Self {
        Self { id, name, kind }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal(_))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self.kind, SymbolKind::NonTerminal)
    }

    pub fn terminal_code(&self) -> Option<TerminalCode> {
        match self.kind {
            SymbolKind::Terminal(code) => Some(code),
            SymbolKind::NonTerminal => None,
        }
    }

    /// Dictionary-independent key used when tables are serialized
    pub fn key(&self) -> SymbolKey {
        match self.kind {
            SymbolKind::Terminal(code) => SymbolKey::Terminal(code),
            SymbolKind::NonTerminal => SymbolKey::NonTerminal(self.name.clone()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Stable identity of a symbol across dictionaries: terminals by code,
/// non-terminals by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolKey {
    Terminal(TerminalCode),
    NonTerminal(String),
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKey::Terminal(code) => match char::from_u32(*code) {
                Some(ch) if *code < EOF_CODE => write!(f, "'{}'", ch),
                _ => write!(f, "#{}", code),
            },
            SymbolKey::NonTerminal(name) => f.write_str(name),
        }
    }
}
