//! The shared expression grammar
//!
//! Parse tables are generated from [`build_expression_grammar`] by the build
//! script and installed at first use. [`configure_expression_grammar`] still
//! runs the full LR(1) construction, for reports and for checking the
//! generated tables.

use super::prebuilt;
use super::rules::build_expression_grammar;
use crate::logging::codes;
use crate::{log_error, log_success};
use expr_grammar::{ConfigureReport, Grammar, GrammarError, GrammarTables};
use std::sync::{Arc, OnceLock};

static EXPRESSION_GRAMMAR: OnceLock<Result<Arc<Grammar>, GrammarError>> = OnceLock::new();

/// Build and configure the expression grammar
pub fn configure_expression_grammar() -> Result<(Grammar, ConfigureReport), GrammarError> {
    let mut grammar = build_expression_grammar();
    let report = grammar.configure()?;
    Ok((grammar, report))
}

/// The shared, configured expression grammar.
///
/// Tables are installed once per process; a failure is cached and returned
/// to every caller.
pub fn expression_grammar() -> Result<Arc<Grammar>, GrammarError> {
    EXPRESSION_GRAMMAR
        .get_or_init(|| match grammar_from_tables(&prebuilt::expression_tables()) {
            Ok(grammar) => {
                log_success!(codes::success::GRAMMAR_CONFIGURED, "Expression grammar installed",
                    "states" => grammar.state_count(),
                    "rules" => grammar.rules().len()
                );
                Ok(Arc::new(grammar))
            }
            Err(error) => {
                log_error!(grammar_error_code(&error), &error.to_string());
                Err(error)
            }
        })
        .clone()
}

/// Rebuild the grammar from exported tables instead of configuring
pub fn grammar_from_tables(tables: &GrammarTables) -> Result<Grammar, GrammarError> {
    let mut grammar = build_expression_grammar();
    grammar.install_tables(tables)?;
    Ok(grammar)
}

pub fn grammar_error_code(error: &GrammarError) -> crate::logging::Code {
    match error {
        GrammarError::MissingStartSymbol { .. } => codes::grammar::MISSING_START_SYMBOL,
        GrammarError::UnknownSymbol { .. } => codes::grammar::UNKNOWN_SYMBOL,
        GrammarError::Conflicts { .. } => codes::grammar::GRAMMAR_CONFLICT,
        GrammarError::NotConfigured { .. } => codes::grammar::NOT_CONFIGURED,
        GrammarError::InvalidTables { .. } => codes::grammar::INVALID_TABLES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{AstFactory, ExprNode, NonTerminal};
    use crate::syntax::ExprParser;
    use assert_matches::assert_matches;

    #[test]
    fn grammar_configures_without_conflicts() {
        let (grammar, report) = configure_expression_grammar().unwrap();
        assert!(grammar.is_configured());
        assert!(report.state_count > 0);
        // START plus every production above
        assert_eq!(report.rule_count, 53);
        assert!(!report.resolutions.is_empty());
    }

    #[test]
    fn shared_grammar_is_reused() {
        let first = expression_grammar().unwrap();
        let second = expression_grammar().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn configuration_is_deterministic() {
        let (a, _) = configure_expression_grammar().unwrap();
        let (b, _) = configure_expression_grammar().unwrap();
        assert_eq!(a.tables().unwrap(), b.tables().unwrap());
    }

    #[test]
    fn tables_reinstall_into_fresh_grammar() {
        let (configured, _) = configure_expression_grammar().unwrap();
        let json = configured.tables().unwrap().to_json().unwrap();
        let tables = GrammarTables::from_json(&json).unwrap();

        let installed = grammar_from_tables(&tables).unwrap();
        assert!(installed.is_configured());
        assert_eq!(installed.state_count(), configured.state_count());
    }

    #[test]
    fn rust_tables_name_their_entry_point() {
        let (configured, _) = configure_expression_grammar().unwrap();
        let source = configured.emit_rust_tables("expression_tables").unwrap();
        assert!(source.contains("pub fn expression_tables() -> GrammarTables {"));
    }

    #[test]
    fn generated_tables_match_configured_ones() {
        let (configured, _) = configure_expression_grammar().unwrap();
        let generated = prebuilt::expression_tables();
        assert_eq!(generated, configured.tables().unwrap());

        let installed = grammar_from_tables(&generated).unwrap();
        assert_eq!(installed.tables().unwrap(), generated);
    }

    #[test]
    fn generated_tables_parse_with_precedence() {
        let grammar = Arc::new(grammar_from_tables(&prebuilt::expression_tables()).unwrap());
        let tree = ExprParser::with_grammar(grammar, AstFactory)
            .parse("a+b*c")
            .unwrap();
        assert_matches!(
            tree,
            ExprNode::Binary { op: '+', right, .. }
                if matches!(*right, ExprNode::Binary { op: '*', .. })
        );
    }

    #[test]
    fn shared_grammar_uses_generated_tables() {
        let shared = expression_grammar().unwrap();
        assert_eq!(shared.tables().unwrap(), prebuilt::expression_tables());
    }

    #[test]
    fn every_nonterminal_has_rules() {
        let grammar = build_expression_grammar();
        for nt in NonTerminal::ALL {
            let id = grammar.dictionary().lookup_nonterminal(nt.as_str()).unwrap();
            assert!(
                grammar.rules().iter().any(|r| r.lhs() == id),
                "{} has no productions",
                nt
            );
        }
    }
}
