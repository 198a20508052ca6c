//! Symbol interning
//!
//! Terminals are keyed by their terminal code and non-terminals by name. The
//! first request for a key creates the symbol; every later request returns
//! the same [`SymbolId`].

use super::symbol::{Symbol, SymbolId, SymbolKey, SymbolKind, TerminalCode, EOF_CODE};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Dictionary {
    symbols: Vec<Symbol>,
    terminals: HashMap<TerminalCode, SymbolId>,
    nonterminals: HashMap<String, SymbolId>,
}

impl Dictionary {
    /// Create a dictionary holding only the end-of-input terminal
    pub fn new() -> Self {
        let mut dictionary = Self {
            symbols: Vec::new(),
            terminals: HashMap::new(),
            nonterminals: HashMap::new(),
        };
        dictionary.terminal(EOF_CODE, "$end");
        dictionary
    }

    /// Canonical terminal for `code`. `display` names the symbol the first
    /// time it is interned and is ignored afterwards.
    pub fn terminal(&mut self, code: TerminalCode, display: &str) -> SymbolId {
        if let Some(&id) = self.terminals.get(&code) {
            return id;
        }
        let id = self.next_id();
        self.symbols.push(Symbol::new(
            id,
            display.to_string(),
            SymbolKind::Terminal(code),
        ));
        self.terminals.insert(code, id);
        id
    }

    /// Canonical terminal for a single punctuation character
    pub fn char_terminal(&mut self, ch: char) -> SymbolId {
        self.terminal(ch as TerminalCode, &ch.to_string())
    }

    /// Canonical non-terminal named `name`
    pub fn nonterminal(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.nonterminals.get(name) {
            return id;
        }
        let id = self.next_id();
        self.symbols
            .push(Symbol::new(id, name.to_string(), SymbolKind::NonTerminal));
        self.nonterminals.insert(name.to_string(), id);
        id
    }

    pub fn eof(&self) -> SymbolId {
        // Interned first by `new`.
        SymbolId(0)
    }

    pub fn lookup_terminal(&self, code: TerminalCode) -> Option<SymbolId> {
        self.terminals.get(&code).copied()
    }

    pub fn lookup_nonterminal(&self, name: &str) -> Option<SymbolId> {
        self.nonterminals.get(name).copied()
    }

    pub fn lookup(&self, key: &SymbolKey) -> Option<SymbolId> {
        match key {
            SymbolKey::Terminal(code) => self.lookup_terminal(*code),
            SymbolKey::NonTerminal(name) => self.lookup_nonterminal(name),
        }
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Display name of `id`, or `?` for a handle from another dictionary
    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map(Symbol::name).unwrap_or("?")
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.get(id).map(Symbol::is_terminal).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    fn next_id(&self) -> SymbolId {
        SymbolId(self.symbols.len() as u32)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_returns_same_handle() {
        let mut dict = Dictionary::new();
        let expr = dict.nonterminal("Expr");
        let plus = dict.char_terminal('+');
        assert_eq!(dict.nonterminal("Expr"), expr);
        assert_eq!(dict.char_terminal('+'), plus);
        assert_eq!(dict.terminal('+' as u32, "plus"), plus);
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_terminals_and_nonterminals_do_not_collide() {
        let mut dict = Dictionary::new();
        let nt = dict.nonterminal("+");
        let t = dict.char_terminal('+');
        assert_ne!(nt, t);
        assert!(dict.is_terminal(t));
        assert!(!dict.is_terminal(nt));
    }

    #[test]
    fn test_eof_is_preinterned() {
        let dict = Dictionary::new();
        let eof = dict.eof();
        assert_eq!(dict.lookup_terminal(EOF_CODE), Some(eof));
        assert_eq!(dict.name(eof), "$end");
    }

    #[test]
    fn test_lookup_by_key() {
        let mut dict = Dictionary::new();
        let args = dict.nonterminal("Args");
        let key = dict.get(args).map(Symbol::key);
        assert_eq!(key, Some(SymbolKey::NonTerminal("Args".to_string())));
        assert_eq!(dict.lookup(&SymbolKey::NonTerminal("Args".into())), Some(args));
        assert_eq!(dict.lookup(&SymbolKey::Terminal(999)), None);
    }
}
