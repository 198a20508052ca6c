//! Function name lookup
//!
//! Names resolve through the catalog categories in order; the first
//! category that knows a name wins. The index is built once and shared.

use super::catalog::{CatalogFilter, Category, FunctionEntry, Support, CATEGORIES};
use super::ExpressionFilter;
use crate::pipeline::CompileError;
use expr_grammar::Span;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct FilterRegistry {
    categories: &'static [Category],
    index: HashMap<&'static str, &'static FunctionEntry>,
}

static GLOBAL_REGISTRY: OnceLock<FilterRegistry> = OnceLock::new();

impl FilterRegistry {
    pub fn new() -> Self {
        Self::from_categories(CATEGORIES)
    }

    pub fn from_categories(categories: &'static [Category]) -> Self {
        let mut index = HashMap::new();
        for category in categories {
            for entry in category.entries {
                for name in entry.names() {
                    index.entry(name).or_insert(entry);
                }
            }
        }
        Self { categories, index }
    }

    /// The registry shared by every compile in the process
    pub fn global() -> &'static FilterRegistry {
        GLOBAL_REGISTRY.get_or_init(FilterRegistry::new)
    }

    pub fn lookup(&self, name: &str) -> Option<&'static FunctionEntry> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Category that resolves `name`
    pub fn category_of(&self, name: &str) -> Option<&'static str> {
        let entry = self.lookup(name)?;
        self.categories
            .iter()
            .find(|category| category.entries.iter().any(|e| std::ptr::eq(e, entry)))
            .map(|category| category.name)
    }

    /// Number of callable names, aliases included
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn categories(&self) -> &'static [Category] {
        self.categories
    }

    /// Create the filter for a call to `name`
    pub fn create(&self, name: &str, span: Span) -> Result<Box<dyn ExpressionFilter>, CompileError> {
        let entry = self.lookup(name).ok_or_else(|| CompileError::UnknownFunction {
            name: name.to_string(),
            span,
        })?;
        match entry.support {
            Support::Available => Ok(Box::new(CatalogFilter::new(name, entry))),
            Support::Unsupported(reason) => Err(CompileError::UnsupportedFilter {
                function: name.to_string(),
                reason,
                span,
            }),
        }
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
