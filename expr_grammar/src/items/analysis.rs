//! Nullable and FIRST sets over a rule list

use crate::rules::Rule;
use crate::symbols::{Dictionary, SymbolId};
use std::collections::{BTreeMap, BTreeSet};

/// Precomputed facts the closure step needs: which symbols derive the empty
/// string, the FIRST set of every symbol, and the rules of each non-terminal.
#[derive(Debug, Clone)]
pub struct GrammarAnalysis {
    nullable: Vec<bool>,
    first: Vec<BTreeSet<SymbolId>>,
    rules_by_lhs: BTreeMap<SymbolId, Vec<usize>>,
}

impl GrammarAnalysis {
    pub fn new(rules: &[Rule], dictionary: &Dictionary) -> Self {
        let count = dictionary.len();
        let mut nullable = vec![false; count];
        let mut first: Vec<BTreeSet<SymbolId>> = vec![BTreeSet::new(); count];

        for symbol in dictionary.iter().filter(|s| s.is_terminal()) {
            first[symbol.id().index()].insert(symbol.id());
        }

        let mut rules_by_lhs: BTreeMap<SymbolId, Vec<usize>> = BTreeMap::new();
        for (index, rule) in rules.iter().enumerate() {
            rules_by_lhs.entry(rule.lhs()).or_default().push(index);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for rule in rules {
                let lhs = rule.lhs().index();
                let mut all_nullable = true;
                for symbol in rule.rhs() {
                    let additions: Vec<SymbolId> = first[symbol.index()]
                        .iter()
                        .filter(|s| !first[lhs].contains(s))
                        .copied()
                        .collect();
                    if !additions.is_empty() {
                        first[lhs].extend(additions);
                        changed = true;
                    }
                    if !nullable[symbol.index()] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }

        Self {
            nullable,
            first,
            rules_by_lhs,
        }
    }

    pub fn is_nullable(&self, symbol: SymbolId) -> bool {
        self.nullable.get(symbol.index()).copied().unwrap_or(false)
    }

    pub fn first(&self, symbol: SymbolId) -> Option<&BTreeSet<SymbolId>> {
        self.first.get(symbol.index())
    }

    /// FIRST(sequence · lookahead)
    pub fn first_of_sequence(
        &self,
        sequence: &[SymbolId],
        lookahead: SymbolId,
    ) -> BTreeSet<SymbolId> {
        let mut result = BTreeSet::new();
        for symbol in sequence {
            if let Some(first) = self.first(*symbol) {
                result.extend(first.iter().copied());
            }
            if !self.is_nullable(*symbol) {
                return result;
            }
        }
        result.insert(lookahead);
        result
    }

    pub fn rules_for(&self, lhs: SymbolId) -> &[usize] {
        self.rules_by_lhs
            .get(&lhs)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
