//! Closed item sets with their shift and reduce actions

use super::analysis::GrammarAnalysis;
use super::item::ConfiguratingItem;
use crate::rules::Rule;
use crate::symbols::{Dictionary, SymbolId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// A set of LR(1) items closed under the grammar, plus the actions
/// computed for it while the automaton is built.
///
/// Equality of configurating sets is equality of their items; actions are
/// derived data.
#[derive(Debug, Clone)]
pub struct ConfiguratingSet {
    items: BTreeSet<ConfiguratingItem>,
    shift: BTreeMap<SymbolId, usize>,
    reduce: BTreeMap<SymbolId, usize>,
    conflicted: bool,
}

impl ConfiguratingSet {
    /// Close `kernel`: for each item with the dot before a non-terminal `B`,
    /// add `(B → •γ, b)` for every rule of `B` and every `b` in FIRST(β a).
    pub fn closure(
        kernel: impl IntoIterator<Item = ConfiguratingItem>,
        rules: &[Rule],
        analysis: &GrammarAnalysis,
    ) -> Self {
        let mut items: BTreeSet<ConfiguratingItem> = BTreeSet::new();
        let mut pending: Vec<ConfiguratingItem> = Vec::new();
        for item in kernel {
            if items.insert(item) {
                pending.push(item);
            }
        }

        while let Some(item) = pending.pop() {
            let Some(next) = item.next_symbol(rules) else {
                continue;
            };
            let candidates = analysis.rules_for(next);
            if candidates.is_empty() {
                continue;
            }
            let lookaheads = analysis.first_of_sequence(item.remainder(rules), item.lookahead);
            for &rule in candidates {
                for &lookahead in &lookaheads {
                    let added = ConfiguratingItem::new(rule, 0, lookahead);
                    if items.insert(added) {
                        pending.push(added);
                    }
                }
            }
        }

        Self {
            items,
            shift: BTreeMap::new(),
            reduce: BTreeMap::new(),
            conflicted: false,
        }
    }

    pub fn items(&self) -> &BTreeSet<ConfiguratingItem> {
        &self.items
    }

    /// Symbols that appear right after a dot
    pub fn shift_symbols(&self, rules: &[Rule]) -> BTreeSet<SymbolId> {
        self.items
            .iter()
            .filter_map(|item| item.next_symbol(rules))
            .collect()
    }

    /// Items with the dot advanced over `symbol`, before closure
    pub fn successor_kernel(&self, symbol: SymbolId, rules: &[Rule]) -> Vec<ConfiguratingItem> {
        self.items
            .iter()
            .filter(|item| item.next_symbol(rules) == Some(symbol))
            .map(ConfiguratingItem::advanced)
            .collect()
    }

    /// Lookaheads of completed items
    pub fn reduce_symbols(&self, rules: &[Rule]) -> BTreeSet<SymbolId> {
        self.items
            .iter()
            .filter(|item| item.is_complete(rules))
            .map(|item| item.lookahead)
            .collect()
    }

    /// Distinct rules reducible on `lookahead`
    pub fn reduce_rules(&self, lookahead: SymbolId, rules: &[Rule]) -> BTreeSet<usize> {
        self.items
            .iter()
            .filter(|item| item.lookahead == lookahead && item.is_complete(rules))
            .map(|item| item.rule)
            .collect()
    }

    pub fn shift_target(&self, symbol: SymbolId) -> Option<usize> {
        self.shift.get(&symbol).copied()
    }

    pub fn reduce_rule(&self, symbol: SymbolId) -> Option<usize> {
        self.reduce.get(&symbol).copied()
    }

    pub fn set_shift(&mut self, symbol: SymbolId, state: usize) {
        self.shift.insert(symbol, state);
    }

    pub fn set_reduce(&mut self, symbol: SymbolId, rule: usize) {
        self.reduce.insert(symbol, rule);
    }

    pub fn remove_shift(&mut self, symbol: SymbolId) {
        self.shift.remove(&symbol);
    }

    pub fn remove_reduce(&mut self, symbol: SymbolId) {
        self.reduce.remove(&symbol);
    }

    pub fn shifts(&self) -> &BTreeMap<SymbolId, usize> {
        &self.shift
    }

    pub fn reduces(&self) -> &BTreeMap<SymbolId, usize> {
        &self.reduce
    }

    pub fn mark_conflicted(&mut self) {
        self.conflicted = true;
    }

    pub fn is_conflicted(&self) -> bool {
        self.conflicted
    }

    /// Multi-line listing of the items, one per line
    pub fn describe(&self, rules: &[Rule], dictionary: &Dictionary) -> String {
        let mut out = String::new();
        for item in &self.items {
            if let Some(rule) = rules.get(item.rule) {
                let _ = writeln!(
                    out,
                    "    {}, {}",
                    rule.describe(dictionary, Some(item.dot)),
                    dictionary.name(item.lookahead)
                );
            }
        }
        out
    }
}

impl PartialEq for ConfiguratingSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ConfiguratingSet {}
