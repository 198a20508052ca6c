use super::CompileError;
use crate::config::compile_time::compile::{MAX_FILTERS_PER_EXPRESSION, MAX_NAME_STACK_DEPTH};
use crate::config::compile_time::syntax::MAX_TREE_DEPTH;
use crate::filters::{DataObject, ExpressionFilter, FilterRecord};
use expr_grammar::Span;

/// Name stack, current data object and filter chain of one compile
#[derive(Debug)]
pub struct ExprPipelineState {
    names: Vec<String>,
    data_object: DataObject,
    filters: Vec<Box<dyn ExpressionFilter>>,
    peak_depth: usize,
    /// Nodes currently being compiled, root included
    nesting: usize,
}

impl ExprPipelineState {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            data_object: DataObject::Source,
            filters: Vec::new(),
            peak_depth: 0,
            nesting: 0,
        }
    }

    /// Enter one tree level; trees not built by the parser can be deeper
    /// than the parser allows
    pub fn enter_node(&mut self, span: Span) -> Result<(), CompileError> {
        if self.nesting >= MAX_TREE_DEPTH {
            return Err(CompileError::LimitExceeded {
                limit: "nested expression levels",
                value: self.nesting + 1,
                max: MAX_TREE_DEPTH,
                span: Some(span),
            });
        }
        self.nesting += 1;
        Ok(())
    }

    pub fn leave_node(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    pub fn push_name(&mut self, name: impl Into<String>) -> Result<(), CompileError> {
        if self.names.len() >= MAX_NAME_STACK_DEPTH {
            return Err(CompileError::LimitExceeded {
                limit: "pending variable names",
                value: self.names.len() + 1,
                max: MAX_NAME_STACK_DEPTH,
                span: None,
            });
        }
        self.names.push(name.into());
        self.peak_depth = self.peak_depth.max(self.names.len());
        Ok(())
    }

    pub fn pop_name(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn num_names(&self) -> usize {
        self.names.len()
    }

    pub fn top_name(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Deepest the name stack has been
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    pub fn data_object(&self) -> &DataObject {
        &self.data_object
    }

    pub fn set_data_object(&mut self, data_object: DataObject) {
        self.data_object = data_object;
    }

    pub fn add_filter(&mut self, filter: Box<dyn ExpressionFilter>) -> Result<(), CompileError> {
        if self.filters.len() >= MAX_FILTERS_PER_EXPRESSION {
            return Err(CompileError::LimitExceeded {
                limit: "filters",
                value: self.filters.len() + 1,
                max: MAX_FILTERS_PER_EXPRESSION,
                span: None,
            });
        }
        self.filters.push(filter);
        Ok(())
    }

    /// Chain `filter` onto the current data object and make its output current
    pub fn append(&mut self, mut filter: Box<dyn ExpressionFilter>) -> Result<(), CompileError> {
        filter.set_input(self.data_object.clone());
        let output = filter.output();
        self.add_filter(filter)?;
        self.data_object = output;
        Ok(())
    }

    pub fn filters(&self) -> &[Box<dyn ExpressionFilter>] {
        &self.filters
    }

    pub fn records(&self) -> Vec<FilterRecord> {
        self.filters.iter().map(|filter| filter.record()).collect()
    }
}

impl Default for ExprPipelineState {
    fn default() -> Self {
        Self::new()
    }
}
