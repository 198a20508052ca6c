use crate::items::ConfiguratingSet;
use crate::symbols::SymbolId;
use std::collections::BTreeMap;

/// One parser state: where to go on each shiftable symbol and which rule to
/// reduce by on each lookahead. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    shift: BTreeMap<SymbolId, usize>,
    reduce: BTreeMap<SymbolId, usize>,
}

impl State {
    pub fn from_set(set: &ConfiguratingSet) -> Self {
        Self {
            shift: set.shifts().clone(),
            reduce: set.reduces().clone(),
        }
    }

    pub(crate) fn from_parts(
        shift: BTreeMap<SymbolId, usize>,
        reduce: BTreeMap<SymbolId, usize>,
    ) -> Self {
        Self { shift, reduce }
    }

    pub fn shift_target(&self, symbol: SymbolId) -> Option<usize> {
        self.shift.get(&symbol).copied()
    }

    pub fn reduce_rule(&self, symbol: SymbolId) -> Option<usize> {
        self.reduce.get(&symbol).copied()
    }

    pub fn shifts(&self) -> &BTreeMap<SymbolId, usize> {
        &self.shift
    }

    pub fn reduces(&self) -> &BTreeMap<SymbolId, usize> {
        &self.reduce
    }
}
