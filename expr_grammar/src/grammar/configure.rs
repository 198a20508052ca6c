//! Automaton construction and conflict resolution

use super::error::{Conflict, ConflictKind, GrammarError, GrammarResult};
use super::Grammar;
use crate::items::{ConfiguratingItem, ConfiguratingSet, GrammarAnalysis};
use crate::rules::Associativity;
use crate::state::State;
use crate::symbols::SymbolId;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Why a shift/reduce clash went one way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionReason {
    /// Shift symbol precedence against the rule's own precedence
    RulePrecedence,
    /// Declared associativity of the shift symbol
    Associativity(Associativity),
    /// Shift symbol precedence against the rule's last terminal
    TerminalPrecedence,
}

/// A shift/reduce clash settled during configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: usize,
    pub symbol: String,
    pub rule: usize,
    pub kept_shift: bool,
    pub reason: ResolutionReason,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kept = if self.kept_shift { "shift" } else { "reduce" };
        write!(
            f,
            "state {}: '{}' vs rule {} -> {} ({:?})",
            self.state, self.symbol, self.rule, kept, self.reason
        )
    }
}

/// Summary of a successful configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigureReport {
    pub state_count: usize,
    pub rule_count: usize,
    pub resolutions: Vec<Resolution>,
}

impl Grammar {
    /// Build the LR(1) automaton and settle conflicts.
    ///
    /// On failure no states are kept and the grammar stays unconfigured.
    pub fn configure(&mut self) -> GrammarResult<ConfigureReport> {
        self.invalidate();
        self.check_ready()?;

        let analysis = GrammarAnalysis::new(&self.rules, &self.dictionary);
        let mut sets = self.build_sets(&analysis);

        let mut conflicts = Vec::new();
        let mut resolutions = Vec::new();
        for (index, set) in sets.iter_mut().enumerate() {
            self.collect_reductions(index, set, &mut conflicts);
            self.resolve_shift_reduce(index, set, &mut resolutions, &mut conflicts);
        }

        if sets.iter().any(ConfiguratingSet::is_conflicted) {
            return Err(GrammarError::Conflicts {
                grammar: self.name.clone(),
                conflicts,
            });
        }

        let states: Vec<State> = sets.iter().map(State::from_set).collect();
        let report = ConfigureReport {
            state_count: states.len(),
            rule_count: self.rules.len(),
            resolutions,
        };
        self.install_states(states);
        Ok(report)
    }

    fn build_sets(&self, analysis: &GrammarAnalysis) -> Vec<ConfiguratingSet> {
        let eof = self.dictionary.eof();
        let initial = ConfiguratingSet::closure(
            [ConfiguratingItem::new(0, 0, eof)],
            &self.rules,
            analysis,
        );

        let mut index: HashMap<BTreeSet<ConfiguratingItem>, usize> = HashMap::new();
        index.insert(initial.items().clone(), 0);
        let mut sets = vec![initial];

        let mut current = 0;
        while current < sets.len() {
            for symbol in sets[current].shift_symbols(&self.rules) {
                let kernel = sets[current].successor_kernel(symbol, &self.rules);
                let next = ConfiguratingSet::closure(kernel, &self.rules, analysis);
                let target = match index.get(next.items()) {
                    Some(&existing) => existing,
                    None => {
                        let added = sets.len();
                        index.insert(next.items().clone(), added);
                        sets.push(next);
                        added
                    }
                };
                sets[current].set_shift(symbol, target);
            }
            current += 1;
        }
        sets
    }

    fn collect_reductions(
        &self,
        index: usize,
        set: &mut ConfiguratingSet,
        conflicts: &mut Vec<Conflict>,
    ) {
        for lookahead in set.reduce_symbols(&self.rules) {
            let candidates = set.reduce_rules(lookahead, &self.rules);
            if candidates.len() > 1 {
                set.mark_conflicted();
                conflicts.push(Conflict {
                    state: index,
                    symbol: self.dictionary.name(lookahead).to_string(),
                    kind: ConflictKind::ReduceReduce {
                        rules: candidates.iter().map(|r| self.rule_text(*r)).collect(),
                    },
                });
            }
            for rule in candidates {
                set.set_reduce(lookahead, rule);
            }
        }
    }

    // Order matters: rule precedence, then associativity of the shift
    // symbol against the rule's last terminal, then that terminal's
    // precedence.
    fn resolve_shift_reduce(
        &self,
        index: usize,
        set: &mut ConfiguratingSet,
        resolutions: &mut Vec<Resolution>,
        conflicts: &mut Vec<Conflict>,
    ) {
        let shift_symbols: Vec<SymbolId> = set.shifts().keys().copied().collect();
        for ssym in shift_symbols {
            let Some(rule_index) = set.reduce_rules(ssym, &self.rules).into_iter().next() else {
                continue;
            };
            let rule = &self.rules[rule_index];
            let sprec = self.prec_of(ssym);

            let mut settle = |keep_shift: bool, reason: ResolutionReason| {
                if keep_shift {
                    set.remove_reduce(ssym);
                } else {
                    set.remove_shift(ssym);
                }
                resolutions.push(Resolution {
                    state: index,
                    symbol: self.dictionary.name(ssym).to_string(),
                    rule: rule_index,
                    kept_shift: keep_shift,
                    reason,
                });
            };

            if let (Some(s), Some(r)) = (sprec, rule.prec()) {
                if s != r {
                    settle(s > r, ResolutionReason::RulePrecedence);
                    continue;
                }
            }

            let rsym = rule.last_terminal(&self.dictionary);
            let rprec = rsym.and_then(|symbol| self.prec_of(symbol));
            let tied = matches!((sprec, rprec), (Some(s), Some(r)) if s == r);

            if let Some(assoc) = self.assoc_of(ssym) {
                if rsym == Some(ssym) || tied {
                    settle(
                        assoc == Associativity::Right,
                        ResolutionReason::Associativity(assoc),
                    );
                    continue;
                }
            }

            if let (Some(s), Some(r)) = (sprec, rprec) {
                if s != r {
                    settle(s > r, ResolutionReason::TerminalPrecedence);
                    continue;
                }
            }

            set.mark_conflicted();
            conflicts.push(Conflict {
                state: index,
                symbol: self.dictionary.name(ssym).to_string(),
                kind: ConflictKind::ShiftReduce {
                    rule: self.rule_text(rule_index),
                },
            });
        }
    }

    fn rule_text(&self, index: usize) -> String {
        self.rules
            .get(index)
            .map(|rule| format!("rule {} ({})", index, rule.describe(&self.dictionary, None)))
            .unwrap_or_else(|| format!("rule {}", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::symbols::Dictionary;
    use assert_matches::assert_matches;

    // E → E + E | E * E | x
    fn arithmetic(with_decls: bool) -> Grammar {
        let mut dict = Dictionary::new();
        let e = dict.nonterminal("E");
        let plus = dict.char_terminal('+');
        let times = dict.char_terminal('*');
        let x = dict.char_terminal('x');
        let mut grammar = Grammar::new("arith", dict);
        grammar.set_start_symbol(e);
        grammar.add_rule(Rule::new(0, e).with_rhs([e, plus, e]));
        grammar.add_rule(Rule::new(1, e).with_rhs([e, times, e]));
        grammar.add_rule(Rule::new(2, e).then(x));
        if with_decls {
            grammar.set_prec(plus, 1);
            grammar.set_prec(times, 2);
            grammar.set_assoc(plus, Associativity::Left);
            grammar.set_assoc(times, Associativity::Left);
        }
        grammar
    }

    #[test]
    fn test_ambiguous_grammar_is_rejected() {
        let mut grammar = arithmetic(false);
        let err = grammar.configure().unwrap_err();
        assert_matches!(err, GrammarError::Conflicts { .. });
        assert!(err
            .conflicts()
            .iter()
            .all(|c| matches!(c.kind, ConflictKind::ShiftReduce { .. })));
        assert!(!grammar.is_configured());
        assert!(grammar.state(0).is_none());
    }

    #[test]
    fn test_precedence_and_associativity_resolve_conflicts() {
        let mut grammar = arithmetic(true);
        let report = grammar.configure().unwrap();
        assert!(grammar.is_configured());
        assert_eq!(report.state_count, grammar.state_count());
        assert!(!report.resolutions.is_empty());
        assert!(report.resolutions.iter().all(|r| matches!(
            r.reason,
            ResolutionReason::Associativity(Associativity::Left)
                | ResolutionReason::TerminalPrecedence
        )));
    }

    #[test]
    fn test_rule_precedence_wins_first() {
        // E → - E [prec 3] | E - E | x, with '-' at 1: after "- E" on '-',
        // the rule's own precedence forces a reduce.
        let mut dict = Dictionary::new();
        let e = dict.nonterminal("E");
        let minus = dict.char_terminal('-');
        let x = dict.char_terminal('x');
        let mut grammar = Grammar::new("unary", dict);
        grammar.set_start_symbol(e);
        grammar.add_rule(Rule::new(0, e).with_rhs([e, minus, e]));
        let unary = grammar.add_rule_with_prec(Rule::new(1, e).with_rhs([minus, e]), 3);
        grammar.add_rule(Rule::new(2, e).then(x));
        grammar.set_prec(minus, 1);
        grammar.set_assoc(minus, Associativity::Left);

        let report = grammar.configure().unwrap();
        let unary_resolution = report
            .resolutions
            .iter()
            .find(|r| r.rule == unary)
            .unwrap();
        assert!(!unary_resolution.kept_shift);
        assert_eq!(unary_resolution.reason, ResolutionReason::RulePrecedence);
    }

    #[test]
    fn test_right_associativity_keeps_shift() {
        let mut dict = Dictionary::new();
        let e = dict.nonterminal("E");
        let caret = dict.char_terminal('^');
        let x = dict.char_terminal('x');
        let mut grammar = Grammar::new("power", dict);
        grammar.set_start_symbol(e);
        grammar.add_rule(Rule::new(0, e).with_rhs([e, caret, e]));
        grammar.add_rule(Rule::new(1, e).then(x));
        grammar.set_assoc(caret, Associativity::Right);

        let report = grammar.configure().unwrap();
        assert!(report.resolutions.iter().all(|r| r.kept_shift));
    }

    #[test]
    fn test_reduce_reduce_conflict_fails() {
        // S → A | B ; A → x ; B → x
        let mut dict = Dictionary::new();
        let s = dict.nonterminal("S");
        let a = dict.nonterminal("A");
        let b = dict.nonterminal("B");
        let x = dict.char_terminal('x');
        let mut grammar = Grammar::new("rr", dict);
        grammar.set_start_symbol(s);
        grammar.add_rule(Rule::new(0, s).then(a));
        grammar.add_rule(Rule::new(1, s).then(b));
        grammar.add_rule(Rule::new(0, a).then(x));
        grammar.add_rule(Rule::new(0, b).then(x));

        let err = grammar.configure().unwrap_err();
        assert_matches!(
            err.conflicts().first().map(|c| &c.kind),
            Some(ConflictKind::ReduceReduce { rules }) if rules.len() == 2
        );
    }

    #[test]
    fn test_missing_start_symbol() {
        let mut grammar = Grammar::new("empty", Dictionary::new());
        assert_matches!(
            grammar.configure(),
            Err(GrammarError::MissingStartSymbol { .. })
        );
    }

    #[test]
    fn test_configure_is_deterministic() {
        let mut first = arithmetic(true);
        let mut second = arithmetic(true);
        first.configure().unwrap();
        second.configure().unwrap();
        assert_eq!(first.to_string(), second.to_string());
    }
}
