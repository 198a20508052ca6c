use super::CompileStats;
use crate::filters::{DataObject, FilterRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled expression: its filter chain and the variable it produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledExpression {
    pub source: String,
    pub output_variable: String,
    /// In append order; each reads the previous one's output
    pub filters: Vec<FilterRecord>,
    pub data_object: DataObject,
    pub stats: CompileStats,
}

impl CompiledExpression {
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// True for a plain variable reference
    pub fn is_passthrough(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} => {}", self.source, self.output_variable)?;
        for filter in &self.filters {
            writeln!(f, "{}", filter)?;
        }
        Ok(())
    }
}
