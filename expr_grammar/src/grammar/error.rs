use std::fmt;

pub type GrammarResult<T> = Result<T, GrammarError>;

/// Grammar construction failures. All of them mean the grammar must not be
/// used for parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    #[error("Grammar '{grammar}' has no start symbol")]
    MissingStartSymbol { grammar: String },

    #[error("Grammar '{grammar}': rule {rule} uses a symbol that is not in its dictionary")]
    UnknownSymbol { grammar: String, rule: usize },

    #[error("Grammar '{grammar}' has {} unresolved conflict(s)", conflicts.len())]
    Conflicts {
        grammar: String,
        conflicts: Vec<Conflict>,
    },

    #[error("Grammar '{grammar}' is not configured")]
    NotConfigured { grammar: String },

    #[error("Invalid parse tables for grammar '{grammar}': {reason}")]
    InvalidTables { grammar: String, reason: String },
}

impl GrammarError {
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            GrammarError::Conflicts { conflicts, .. } => conflicts,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce { rule: String },
    ReduceReduce { rules: Vec<String> },
}

/// An action clash that precedence and associativity could not settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub symbol: String,
    pub kind: ConflictKind,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConflictKind::ShiftReduce { rule } => write!(
                f,
                "state {}: shift/reduce conflict on '{}' (shift vs reduce {})",
                self.state, self.symbol, rule
            ),
            ConflictKind::ReduceReduce { rules } => write!(
                f,
                "state {}: reduce/reduce conflict on '{}' between {}",
                self.state,
                self.symbol,
                rules.join(" and ")
            ),
        }
    }
}
