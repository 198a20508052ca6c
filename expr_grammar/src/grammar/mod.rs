//! Grammar definition and automaton ownership
//!
//! A [`Grammar`] collects rules, a start symbol and the precedence and
//! associativity declarations used to settle shift/reduce conflicts. Calling
//! [`Grammar::configure`] builds the canonical LR(1) automaton; until that
//! succeeds (or tables are installed) the grammar refuses to drive a parser.

pub mod configure;
pub mod error;
pub mod tables;

pub use configure::{ConfigureReport, Resolution, ResolutionReason};
pub use error::{Conflict, ConflictKind, GrammarError, GrammarResult};
pub use tables::{GrammarTables, StateTable, STATES_PER_CHUNK};

use crate::rules::{Associativity, Rule};
use crate::state::State;
use crate::symbols::{Dictionary, SymbolId};
use std::collections::HashMap;
use std::fmt;

/// Name of the synthetic start non-terminal owning rule 0
pub const START_SYMBOL: &str = "START";

#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    dictionary: Dictionary,
    rules: Vec<Rule>,
    start: Option<SymbolId>,
    prec: HashMap<SymbolId, u32>,
    assoc: HashMap<SymbolId, Associativity>,
    states: Vec<State>,
    configured: bool,
}

impl Grammar {
    /// Create an empty grammar. Rule 0 is reserved for `START → <start>`.
    pub fn new(name: &str, mut dictionary: Dictionary) -> Self {
        let start_nt = dictionary.nonterminal(START_SYMBOL);
        Self {
            name: name.to_string(),
            dictionary,
            rules: vec![Rule::new(0, start_nt)],
            start: None,
            prec: HashMap::new(),
            assoc: HashMap::new(),
            states: Vec::new(),
            configured: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Mutable access for interning further symbols. Invalidates any
    /// configured automaton.
    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        self.invalidate();
        &mut self.dictionary
    }

    /// Append a production, returning its index
    pub fn add_rule(&mut self, mut rule: Rule) -> usize {
        self.invalidate();
        let index = self.rules.len();
        rule.set_index(index);
        self.rules.push(rule);
        index
    }

    /// Append a production whose precedence overrides the rule's own
    pub fn add_rule_with_prec(&mut self, mut rule: Rule, prec: u32) -> usize {
        rule.set_prec(prec);
        self.add_rule(rule)
    }

    /// Install rule 0 as `START → symbol`
    pub fn set_start_symbol(&mut self, symbol: SymbolId) {
        self.invalidate();
        let start_nt = self.rules[0].lhs();
        self.rules[0] = Rule::new(0, start_nt).then(symbol);
        self.start = Some(symbol);
    }

    pub fn start_symbol(&self) -> Option<SymbolId> {
        self.start
    }

    pub fn set_assoc(&mut self, symbol: SymbolId, assoc: Associativity) {
        self.invalidate();
        self.assoc.insert(symbol, assoc);
    }

    pub fn set_prec(&mut self, symbol: SymbolId, level: u32) {
        self.invalidate();
        self.prec.insert(symbol, level);
    }

    pub fn prec_of(&self, symbol: SymbolId) -> Option<u32> {
        self.prec.get(&symbol).copied()
    }

    pub fn assoc_of(&self, symbol: SymbolId) -> Option<Associativity> {
        self.assoc.get(&symbol).copied()
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn state(&self, index: usize) -> Option<&State> {
        if self.configured {
            self.states.get(index)
        } else {
            None
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Error unless the automaton is ready for parsing
    pub fn ensure_configured(&self) -> GrammarResult<()> {
        if self.configured {
            Ok(())
        } else {
            Err(GrammarError::NotConfigured {
                grammar: self.name.clone(),
            })
        }
    }

    pub(crate) fn install_states(&mut self, states: Vec<State>) {
        self.states = states;
        self.configured = true;
    }

    fn invalidate(&mut self) {
        self.states.clear();
        self.configured = false;
    }

    pub(crate) fn check_ready(&self) -> GrammarResult<SymbolId> {
        let start = self.start.ok_or_else(|| GrammarError::MissingStartSymbol {
            grammar: self.name.clone(),
        })?;
        for rule in &self.rules {
            let foreign = std::iter::once(rule.lhs())
                .chain(rule.rhs().iter().copied())
                .any(|symbol| self.dictionary.get(symbol).is_none());
            if foreign {
                return Err(GrammarError::UnknownSymbol {
                    grammar: self.name.clone(),
                    rule: rule.index(),
                });
            }
        }
        Ok(start)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grammar {}", self.name)?;
        writeln!(f, "Rules:")?;
        for rule in &self.rules {
            write!(f, "  {:>3}: {}", rule.index(), rule.describe(&self.dictionary, None))?;
            match rule.prec() {
                Some(prec) => writeln!(f, "    [prec {}]", prec)?,
                None => writeln!(f)?,
            }
        }
        if !self.configured {
            return writeln!(f, "(not configured)");
        }
        writeln!(f, "States:")?;
        for (index, state) in self.states.iter().enumerate() {
            writeln!(f, "  State {}", index)?;
            for (symbol, target) in state.shifts() {
                writeln!(
                    f,
                    "    shift  {:<12} -> {}",
                    self.dictionary.name(*symbol),
                    target
                )?;
            }
            for (symbol, rule) in state.reduces() {
                writeln!(
                    f,
                    "    reduce {:<12} -> rule {}",
                    self.dictionary.name(*symbol),
                    rule
                )?;
            }
        }
        Ok(())
    }
}
