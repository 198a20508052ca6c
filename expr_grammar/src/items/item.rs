use crate::rules::Rule;
use crate::symbols::SymbolId;

/// `(rule, dot, lookahead)`: the parser has matched `rule.rhs[..dot]` and
/// may reduce when the rest is matched and `lookahead` follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfiguratingItem {
    pub rule: usize,
    pub dot: usize,
    pub lookahead: SymbolId,
}

impl ConfiguratingItem {
    pub fn new(rule: usize, dot: usize, lookahead: SymbolId) -> Self {
        Self {
            rule,
            dot,
            lookahead,
        }
    }

    /// Symbol right after the dot, if any
    pub fn next_symbol(&self, rules: &[Rule]) -> Option<SymbolId> {
        rules
            .get(self.rule)
            .and_then(|rule| rule.rhs().get(self.dot))
            .copied()
    }

    /// Symbols after the one following the dot
    pub fn remainder<'r>(&self, rules: &'r [Rule]) -> &'r [SymbolId] {
        rules
            .get(self.rule)
            .and_then(|rule| rule.rhs().get(self.dot + 1..))
            .unwrap_or(&[])
    }

    pub fn is_complete(&self, rules: &[Rule]) -> bool {
        rules
            .get(self.rule)
            .map(|rule| self.dot >= rule.len())
            .unwrap_or(true)
    }

    pub fn advanced(&self) -> Self {
        Self {
            dot: self.dot + 1,
            ..*self
        }
    }
}
