//! Non-terminal symbols of the expression grammar
use serde::{Deserialize, Serialize};

/// Every left-hand side of the expression grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonTerminal {
    Expr,
    Constant,
    Vector,
    List,
    ListElems,
    ListElem,
    Function,
    Args,
    Arg,
    PathSpec,
    MultiSlash,
    Variable,
    DBSpec,
    MachSpec,
    TimeSpec,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 15] = [
        Self::Expr,
        Self::Constant,
        Self::Vector,
        Self::List,
        Self::ListElems,
        Self::ListElem,
        Self::Function,
        Self::Args,
        Self::Arg,
        Self::PathSpec,
        Self::MultiSlash,
        Self::Variable,
        Self::DBSpec,
        Self::MachSpec,
        Self::TimeSpec,
    ];

    /// Dictionary name, as shown in grammar dumps
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expr => "<Expr>",
            Self::Constant => "<Constant>",
            Self::Vector => "<Vector>",
            Self::List => "<List>",
            Self::ListElems => "<ListElems>",
            Self::ListElem => "<ListElem>",
            Self::Function => "<Function>",
            Self::Args => "<Args>",
            Self::Arg => "<Arg>",
            Self::PathSpec => "<PathSpec>",
            Self::MultiSlash => "<MultiSlash>",
            Self::Variable => "<Variable>",
            Self::DBSpec => "<DBSpec>",
            Self::MachSpec => "<MachSpec>",
            Self::TimeSpec => "<TimeSpec>",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|nt| nt.as_str() == name)
    }
}

impl std::fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for nt in NonTerminal::ALL {
            assert_eq!(NonTerminal::from_name(nt.as_str()), Some(nt));
        }
        assert_eq!(NonTerminal::from_name("START"), None);
    }
}
