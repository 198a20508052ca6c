//! Serializable parse tables and generated initialization source
//!
//! Tables are keyed by [`SymbolKey`] so they can be reinstalled into any
//! grammar built with the same rules, whatever order its dictionary interned
//! symbols in.

use super::error::{GrammarError, GrammarResult};
use super::Grammar;
use crate::state::State;
use crate::symbols::{Symbol, SymbolId, SymbolKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Number of states written by each generated initialization function
pub const STATES_PER_CHUNK: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateTable {
    pub shift: Vec<(SymbolKey, usize)>,
    pub reduce: Vec<(SymbolKey, usize)>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shift(mut self, symbol: SymbolKey, state: usize) -> Self {
        self.shift.push((symbol, state));
        self
    }

    pub fn with_reduce(mut self, symbol: SymbolKey, rule: usize) -> Self {
        self.reduce.push((symbol, rule));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarTables {
    pub grammar: String,
    pub rule_count: usize,
    pub states: Vec<StateTable>,
}

impl GrammarTables {
    pub fn to_json(&self) -> GrammarResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GrammarError::InvalidTables {
            grammar: self.grammar.clone(),
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> GrammarResult<Self> {
        serde_json::from_str(json).map_err(|e| GrammarError::InvalidTables {
            grammar: String::from("<json>"),
            reason: e.to_string(),
        })
    }
}

impl Grammar {
    /// Export the configured automaton
    pub fn tables(&self) -> GrammarResult<GrammarTables> {
        self.ensure_configured()?;
        let key = |id: SymbolId| {
            self.dictionary
                .get(id)
                .map(Symbol::key)
                .ok_or_else(|| self.invalid_tables("state refers to an unknown symbol"))
        };

        let mut states = Vec::with_capacity(self.states.len());
        for state in &self.states {
            let mut table = StateTable::new();
            for (&symbol, &target) in state.shifts() {
                table = table.with_shift(key(symbol)?, target);
            }
            for (&symbol, &rule) in state.reduces() {
                table = table.with_reduce(key(symbol)?, rule);
            }
            states.push(table);
        }

        Ok(GrammarTables {
            grammar: self.name.clone(),
            rule_count: self.rules.len(),
            states,
        })
    }

    /// Install previously exported tables instead of configuring.
    ///
    /// The rules must match the ones the tables were built from; symbol keys,
    /// shift targets and rule indexes are checked against this grammar.
    pub fn install_tables(&mut self, tables: &GrammarTables) -> GrammarResult<()> {
        self.invalidate();
        self.check_ready()?;
        if tables.rule_count != self.rules.len() {
            return Err(self.invalid_tables(&format!(
                "built for {} rules, grammar has {}",
                tables.rule_count,
                self.rules.len()
            )));
        }

        let state_count = tables.states.len();
        let mut states = Vec::with_capacity(state_count);
        for (index, table) in tables.states.iter().enumerate() {
            let mut shift = BTreeMap::new();
            for (key, target) in &table.shift {
                let symbol = self.lookup_key(key, index)?;
                if *target >= state_count {
                    return Err(self.invalid_tables(&format!(
                        "state {} shifts to missing state {}",
                        index, target
                    )));
                }
                shift.insert(symbol, *target);
            }
            let mut reduce = BTreeMap::new();
            for (key, rule) in &table.reduce {
                let symbol = self.lookup_key(key, index)?;
                if *rule >= self.rules.len() {
                    return Err(self.invalid_tables(&format!(
                        "state {} reduces by missing rule {}",
                        index, rule
                    )));
                }
                reduce.insert(symbol, *rule);
            }
            states.push(State::from_parts(shift, reduce));
        }

        self.install_states(states);
        Ok(())
    }

    /// Rust source that rebuilds [`Grammar::tables`] without configuring.
    ///
    /// `function` names the public entry point; the states are written by
    /// private helpers of at most [`STATES_PER_CHUNK`] states each.
    pub fn emit_rust_tables(&self, function: &str) -> GrammarResult<String> {
        let tables = self.tables()?;
        let chunks: Vec<&[StateTable]> = tables.states.chunks(STATES_PER_CHUNK).collect();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "// Parse tables for grammar {:?}: {} states, {} rules.",
            tables.grammar,
            tables.states.len(),
            tables.rule_count
        );
        let _ = writeln!(out, "// Generated by expr_grammar. Do not edit.");
        let _ = writeln!(out);
        let _ = writeln!(out, "use expr_grammar::{{GrammarTables, StateTable, SymbolKey}};");
        let _ = writeln!(out);
        let _ = writeln!(out, "pub fn {}() -> GrammarTables {{", function);
        let _ = writeln!(
            out,
            "    let mut states = Vec::with_capacity({});",
            tables.states.len()
        );
        for chunk in 0..chunks.len() {
            let _ = writeln!(out, "    {}_{:03}(&mut states);", function, chunk);
        }
        let _ = writeln!(out, "    GrammarTables {{");
        let _ = writeln!(out, "        grammar: {:?}.to_string(),", tables.grammar);
        let _ = writeln!(out, "        rule_count: {},", tables.rule_count);
        let _ = writeln!(out, "        states,");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");

        for (chunk, states) in chunks.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "fn {}_{:03}(states: &mut Vec<StateTable>) {{",
                function, chunk
            );
            for (offset, state) in states.iter().enumerate() {
                let _ = writeln!(out, "    // state {}", chunk * STATES_PER_CHUNK + offset);
                let _ = writeln!(out, "    states.push(");
                let _ = writeln!(out, "        StateTable::new()");
                for (key, target) in &state.shift {
                    let _ = writeln!(
                        out,
                        "            .with_shift({}, {})",
                        key_source(key),
                        target
                    );
                }
                for (key, rule) in &state.reduce {
                    let _ = writeln!(
                        out,
                        "            .with_reduce({}, {})",
                        key_source(key),
                        rule
                    );
                }
                let _ = writeln!(out, "    );");
            }
            let _ = writeln!(out, "}}");
        }
        Ok(out)
    }

    fn lookup_key(&self, key: &SymbolKey, state: usize) -> GrammarResult<SymbolId> {
        self.dictionary.lookup(key).ok_or_else(|| {
            self.invalid_tables(&format!("state {} uses unknown symbol {}", state, key))
        })
    }

    fn invalid_tables(&self, reason: &str) -> GrammarError {
        GrammarError::InvalidTables {
            grammar: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

fn key_source(key: &SymbolKey) -> String {
    match key {
        SymbolKey::Terminal(code) => format!("SymbolKey::Terminal({})", code),
        SymbolKey::NonTerminal(name) => format!("SymbolKey::NonTerminal({:?}.to_string())", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Associativity, Rule};
    use crate::symbols::Dictionary;
    use assert_matches::assert_matches;

    // L → L , x | x
    fn list_grammar() -> Grammar {
        let mut dict = Dictionary::new();
        let l = dict.nonterminal("L");
        let comma = dict.char_terminal(',');
        let x = dict.char_terminal('x');
        let mut grammar = Grammar::new("list", dict);
        grammar.set_start_symbol(l);
        grammar.add_rule(Rule::new(0, l).with_rhs([l, comma, x]));
        grammar.add_rule(Rule::new(1, l).then(x));
        grammar
    }

    #[test]
    fn test_tables_require_configuration() {
        let grammar = list_grammar();
        assert_matches!(grammar.tables(), Err(GrammarError::NotConfigured { .. }));
    }

    #[test]
    fn test_installed_tables_match_configured_states() {
        let mut configured = list_grammar();
        configured.configure().unwrap();
        let tables = configured.tables().unwrap();

        let mut reloaded = list_grammar();
        reloaded
            .install_tables(&GrammarTables::from_json(&tables.to_json().unwrap()).unwrap())
            .unwrap();
        assert!(reloaded.is_configured());
        assert_eq!(reloaded.to_string(), configured.to_string());
    }

    #[test]
    fn test_install_rejects_mismatched_rules() {
        let mut configured = list_grammar();
        configured.configure().unwrap();
        let tables = configured.tables().unwrap();

        let mut other = list_grammar();
        let x = other.dictionary_mut().char_terminal('x');
        let l = other.dictionary_mut().nonterminal("L");
        other.add_rule(Rule::new(2, l).with_rhs([x, x]));
        assert_matches!(
            other.install_tables(&tables),
            Err(GrammarError::InvalidTables { .. })
        );
    }

    #[test]
    fn test_install_rejects_unknown_symbol() {
        let mut configured = list_grammar();
        configured.configure().unwrap();
        let mut tables = configured.tables().unwrap();
        tables.states[0].shift.push((SymbolKey::Terminal(999), 0));

        let mut reloaded = list_grammar();
        assert_matches!(
            reloaded.install_tables(&tables),
            Err(GrammarError::InvalidTables { .. })
        );
        assert!(!reloaded.is_configured());
    }

    #[test]
    fn test_emitted_source_is_chunked() {
        // A long chain of operators produces enough states for two chunks.
        let mut dict = Dictionary::new();
        let e = dict.nonterminal("E");
        let x = dict.char_terminal('x');
        let ops: Vec<_> = "+-*/%^&|~!?<>=@#$:;.,".chars().map(|c| dict.char_terminal(c)).collect();
        let mut grammar = Grammar::new("wide", dict);
        grammar.set_start_symbol(e);
        for (i, op) in ops.iter().enumerate() {
            grammar.add_rule(Rule::new(i as u32, e).with_rhs([e, *op, e]));
            grammar.set_prec(*op, i as u32 + 1);
            grammar.set_assoc(*op, Associativity::Left);
        }
        grammar.add_rule(Rule::new(ops.len() as u32, e).then(x));
        grammar.configure().unwrap();

        let source = grammar.emit_rust_tables("wide_tables").unwrap();
        let expected_chunks = (grammar.state_count() + STATES_PER_CHUNK - 1) / STATES_PER_CHUNK;
        assert!(expected_chunks >= 1);
        assert!(source.contains("pub fn wide_tables() -> GrammarTables {"));
        assert_eq!(
            source.matches("(states: &mut Vec<StateTable>)").count(),
            expected_chunks
        );
        assert!(source.contains("SymbolKey::NonTerminal(\"E\".to_string())"));
        assert!(source.contains("// state 0"));
    }
}
