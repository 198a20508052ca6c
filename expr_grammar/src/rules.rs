//! Grammar productions

use crate::symbols::{Dictionary, SymbolId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Associativity {
    Left,
    Right,
}

/// One production `lhs → rhs...`.
///
/// `id` numbers the rule among the productions of its left-hand symbol and is
/// what reduction callbacks dispatch on. `index` is the rule's position in the
/// grammar and is assigned when the rule is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    index: usize,
    id: u32,
    lhs: SymbolId,
    rhs: Vec<SymbolId>,
    prec: Option<u32>,
}

impl Rule {
    pub fn new(id: u32, lhs: SymbolId) -> Self {
        Self {
            index: 0,
            id,
            lhs,
            rhs: Vec::new(),
            prec: None,
        }
    }

    /// Append one symbol to the right-hand side
    pub fn then(mut self, symbol: SymbolId) -> Self {
        self.rhs.push(symbol);
        self
    }

    /// Append a sequence of symbols to the right-hand side
    pub fn with_rhs(mut self, symbols: impl IntoIterator<Item = SymbolId>) -> Self {
        self.rhs.extend(symbols);
        self
    }

    pub fn with_prec(mut self, prec: u32) -> Self {
        self.prec = Some(prec);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn lhs(&self) -> SymbolId {
        self.lhs
    }

    pub fn rhs(&self) -> &[SymbolId] {
        &self.rhs
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn prec(&self) -> Option<u32> {
        self.prec
    }

    /// Rightmost terminal of the right-hand side
    pub fn last_terminal(&self, dictionary: &Dictionary) -> Option<SymbolId> {
        self.rhs
            .iter()
            .rev()
            .copied()
            .find(|&symbol| dictionary.is_terminal(symbol))
    }

    /// `Lhs → a b c`, with a dot before position `dot` when given
    pub fn describe(&self, dictionary: &Dictionary, dot: Option<usize>) -> String {
        let mut out = format!("{} →", dictionary.name(self.lhs));
        for (i, symbol) in self.rhs.iter().enumerate() {
            if dot == Some(i) {
                out.push_str(" •");
            }
            out.push(' ');
            out.push_str(dictionary.name(*symbol));
        }
        if dot == Some(self.rhs.len()) {
            out.push_str(" •");
        }
        out
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_prec(&mut self, prec: u32) {
        self.prec = Some(prec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_terminal_skips_nonterminals() {
        let mut dict = Dictionary::new();
        let expr = dict.nonterminal("Expr");
        let minus = dict.char_terminal('-');
        let lbracket = dict.char_terminal('[');
        let rbracket = dict.char_terminal(']');
        let integer = dict.terminal(258, "Integer");

        let binary = Rule::new(1, expr).with_rhs([expr, minus, expr]);
        assert_eq!(binary.last_terminal(&dict), Some(minus));

        let index = Rule::new(6, expr).with_rhs([expr, lbracket, integer, rbracket]);
        assert_eq!(index.last_terminal(&dict), Some(rbracket));

        let passthrough = Rule::new(9, expr).then(dict.nonterminal("Constant"));
        assert_eq!(passthrough.last_terminal(&dict), None);
    }

    #[test]
    fn test_describe_places_dot() {
        let mut dict = Dictionary::new();
        let expr = dict.nonterminal("Expr");
        let plus = dict.char_terminal('+');
        let rule = Rule::new(0, expr).with_rhs([expr, plus, expr]);
        assert_eq!(rule.describe(&dict, None), "Expr → Expr + Expr");
        assert_eq!(rule.describe(&dict, Some(1)), "Expr → Expr • + Expr");
        assert_eq!(rule.describe(&dict, Some(3)), "Expr → Expr + Expr •");
    }
}
