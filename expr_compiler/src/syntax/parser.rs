//! Expression parser: scanner tokens through the LR driver into an AST
//!
//! The driver knows nothing about expressions. Each reduction hands the
//! popped right-hand side to `ExprReducer`, which dispatches on the
//! left-hand side and the rule's per-LHS id and asks the node factory for
//! the result. Whitespace tokens are dropped before they reach the driver.

use super::error::{SyntaxError, SyntaxResult};
use super::sink::ErrorSink;
use crate::config::compile_time::syntax::{MAX_PARSE_DEPTH, MAX_TREE_DEPTH};
use crate::grammar::{
    expression_grammar, ArgExpr, ArgValue, ArgsExpr, AstFactory, DbExpr, ExprNode,
    ExprNodeFactory, ListElemExpr, ListExpr, MachExpr, NonTerminal, PathExpr, TimeExpr,
    TimeFormat,
};
use crate::lexical::LexicalAnalyzer;
use crate::log_debug;
use crate::tokens::{Token, TokenKind};
use expr_grammar::{Element, Grammar, Parser, Reduction, Rule, Span};
use std::sync::Arc;

/// Values on the parse stack, one per non-terminal family
#[derive(Debug, Clone, PartialEq)]
pub enum ParseValue {
    /// Any `Expr`, `Constant`, `Vector`, `Function` or `Variable` reduction
    Expr(ExprNode),
    /// A bracketed `[...]` list
    List(ListExpr),
    /// List elements collected so far, in source order
    ListElems(Vec<ListElemExpr>),
    /// One `begin[:end[:stride]]` element
    ListElem(ListElemExpr),
    /// Function arguments collected so far, in source order
    Args(Vec<ArgExpr>),
    /// One positional, named or list argument
    Arg(ArgExpr),
    /// Path segments joined with single slashes
    Path(PathExpr),
    /// Separators carry no information past the path reduction
    MultiSlash,
    /// Database qualifier of a `<db:path>` variable
    Db(DbExpr),
    /// `@host` qualifier
    Mach(MachExpr),
    /// `[values]suffix` time qualifier
    Time(TimeExpr),
}

impl ParseValue {
    fn kind(&self) -> &'static str {
        match self {
            ParseValue::Expr(_) => "expression",
            ParseValue::List(_) => "list",
            ParseValue::ListElems(_) => "list elements",
            ParseValue::ListElem(_) => "list element",
            ParseValue::Args(_) => "arguments",
            ParseValue::Arg(_) => "argument",
            ParseValue::Path(_) => "path",
            ParseValue::MultiSlash => "separator",
            ParseValue::Db(_) => "database",
            ParseValue::Mach(_) => "machine",
            ParseValue::Time(_) => "time",
        }
    }
}

/// A stack value with the number of expression levels nested inside it
#[derive(Debug, Clone, PartialEq)]
pub struct Reduced {
    pub value: ParseValue,
    /// Longest chain of expression nodes from this value down to a leaf
    pub depth: usize,
}

type ParseElement = Element<Token, Reduced>;

/// Whether a reduction puts a new expression node above its children.
/// Pass-through and list-accumulating rules keep their children's depth.
fn adds_tree_level(nonterminal: NonTerminal, rule: u32) -> bool {
    match nonterminal {
        NonTerminal::Expr => matches!(rule, 0..=7 | 15),
        NonTerminal::Constant
        | NonTerminal::Vector
        | NonTerminal::Function
        | NonTerminal::Variable => true,
        _ => false,
    }
}

/// Typed access to a popped right-hand side, left to right
struct Rhs {
    items: std::vec::IntoIter<ParseElement>,
}

impl Rhs {
    fn new(elements: Vec<ParseElement>) -> Self {
        Self {
            items: elements.into_iter(),
        }
    }

    fn next(&mut self) -> SyntaxResult<ParseElement> {
        self.items
            .next()
            .ok_or_else(|| SyntaxError::internal("reduction ran past its right-hand side"))
    }

    /// Next element, which must be a shifted token
    fn token(&mut self) -> SyntaxResult<Token> {
        match self.next()? {
            Element::Token(token) => Ok(token),
            Element::Value { value, .. } => Err(SyntaxError::internal(format!(
                "expected a token, found {}",
                value.value.kind()
            ))),
        }
    }

    /// Drop punctuation the tree does not keep
    fn skip(&mut self) -> SyntaxResult<()> {
        self.next().map(|_| ())
    }

    fn op(&mut self) -> SyntaxResult<char> {
        let token = self.token()?;
        token
            .as_char()
            .ok_or_else(|| SyntaxError::internal(format!("expected an operator, found {}", token)))
    }

    fn ident(&mut self) -> SyntaxResult<(String, Span)> {
        let token = self.token()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            other => Err(SyntaxError::internal(format!(
                "expected an identifier, found {:?}",
                other
            ))),
        }
    }

    /// Next element, which must be a reduced value; its depth is dropped
    fn value(&mut self) -> SyntaxResult<(ParseValue, Span)> {
        match self.next()? {
            Element::Value { value, span } => Ok((value.value, span)),
            Element::Token(token) => Err(SyntaxError::internal(format!(
                "expected a value, found {}",
                token
            ))),
        }
    }

    fn expr(&mut self) -> SyntaxResult<ExprNode> {
        match self.value()? {
            (ParseValue::Expr(expr), _) => Ok(expr),
            (other, _) => Err(mismatch("expression", &other)),
        }
    }

    fn list_elems(&mut self) -> SyntaxResult<(Vec<ListElemExpr>, Span)> {
        match self.value()? {
            (ParseValue::ListElems(elems), span) => Ok((elems, span)),
            (other, _) => Err(mismatch("list elements", &other)),
        }
    }

    fn list_elem(&mut self) -> SyntaxResult<ListElemExpr> {
        match self.value()? {
            (ParseValue::ListElem(elem), _) => Ok(elem),
            (other, _) => Err(mismatch("list element", &other)),
        }
    }

    fn args(&mut self) -> SyntaxResult<(Vec<ArgExpr>, Span)> {
        match self.value()? {
            (ParseValue::Args(args), span) => Ok((args, span)),
            (other, _) => Err(mismatch("arguments", &other)),
        }
    }

    fn arg(&mut self) -> SyntaxResult<ArgExpr> {
        match self.value()? {
            (ParseValue::Arg(arg), _) => Ok(arg),
            (other, _) => Err(mismatch("argument", &other)),
        }
    }

    fn list(&mut self) -> SyntaxResult<ListExpr> {
        match self.value()? {
            (ParseValue::List(list), _) => Ok(list),
            (other, _) => Err(mismatch("list", &other)),
        }
    }

    fn path(&mut self) -> SyntaxResult<PathExpr> {
        match self.value()? {
            (ParseValue::Path(path), _) => Ok(path),
            (other, _) => Err(mismatch("path", &other)),
        }
    }

    fn db(&mut self) -> SyntaxResult<DbExpr> {
        match self.value()? {
            (ParseValue::Db(db), _) => Ok(db),
            (other, _) => Err(mismatch("database", &other)),
        }
    }

    fn mach(&mut self) -> SyntaxResult<MachExpr> {
        match self.value()? {
            (ParseValue::Mach(mach), _) => Ok(mach),
            (other, _) => Err(mismatch("machine", &other)),
        }
    }

    fn time(&mut self) -> SyntaxResult<TimeExpr> {
        match self.value()? {
            (ParseValue::Time(time), _) => Ok(time),
            (other, _) => Err(mismatch("time", &other)),
        }
    }
}

/// The grammar and the dispatch below disagree
fn mismatch(expected: &str, found: &ParseValue) -> SyntaxError {
    SyntaxError::internal(format!("expected {}, found {}", expected, found.kind()))
}

/// Reduction callback for one parse
struct ExprReducer<'a, F> {
    /// Resolves rule left-hand sides to [`NonTerminal`]s
    grammar: &'a Grammar,
    factory: &'a mut F,
    /// Normalized text, sliced for argument text
    source: &'a str,
    max_tree_depth: usize,
}

impl<'a, F: ExprNodeFactory> ExprReducer<'a, F> {
    /// Operators, indexing, negation, parentheses and the pass-through rules
    fn reduce_expr(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let node = match id {
            0..=5 | 15 => {
                let left = rhs.expr()?;
                let op = rhs.op()?;
                let right = rhs.expr()?;
                self.factory.create_binary(op, left, right, span)
            }
            6 => {
                let operand = rhs.expr()?;
                rhs.skip()?;
                let index = rhs.token()?;
                let index = index.as_integer().ok_or_else(|| {
                    SyntaxError::internal(format!("index is not an integer: {}", index))
                })?;
                self.factory.create_index(operand, index, span)
            }
            7 => {
                let op = rhs.op()?;
                let operand = rhs.expr()?;
                match operand {
                    ExprNode::IntegerConst { value, .. } if value.checked_neg().is_some() => {
                        self.factory.create_integer(-value, span)
                    }
                    ExprNode::FloatConst { value, .. } => self.factory.create_float(-value, span),
                    operand => self.factory.create_unary(op, operand, span),
                }
            }
            8 => {
                rhs.skip()?;
                rhs.expr()?
            }
            9..=12 => rhs.expr()?,
            _ => return Err(unhandled(NonTerminal::Expr, id, span)),
        };
        Ok(ParseValue::Expr(node))
    }

    fn reduce_constant(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let token = rhs.token()?;
        let node = match (id, token.kind) {
            (0, TokenKind::Integer(value)) => self.factory.create_integer(value, span),
            (1, TokenKind::Float(value)) => self.factory.create_float(value, span),
            (2, TokenKind::String(value)) => self.factory.create_string(value, span),
            (3, TokenKind::Bool(value)) => self.factory.create_bool(value, span),
            _ => return Err(unhandled(NonTerminal::Constant, id, span)),
        };
        Ok(ParseValue::Expr(node))
    }

    fn reduce_vector(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let count = match id {
            0 => 2,
            1 => 3,
            _ => return Err(unhandled(NonTerminal::Vector, id, span)),
        };
        let mut components = Vec::with_capacity(count);
        for _ in 0..count {
            rhs.skip()?; // '{' or ','
            components.push(rhs.expr()?);
        }
        Ok(ParseValue::Expr(self.factory.create_vector(components, span)))
    }

    fn reduce_function(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let (name, _) = rhs.ident()?;
        rhs.skip()?;
        let args = match id {
            0 => None,
            1 => {
                let (args, args_span) = rhs.args()?;
                Some(ArgsExpr {
                    args,
                    span: args_span,
                })
            }
            _ => return Err(unhandled(NonTerminal::Function, id, span)),
        };
        Ok(ParseValue::Expr(self.factory.create_function(name, args, span)))
    }

    /// Positional, `name=expr` or list argument, keeping its source text
    fn reduce_arg(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let (name, value) = match id {
            0 => (None, ArgValue::Expr(rhs.expr()?)),
            1 => {
                let (name, _) = rhs.ident()?;
                rhs.skip()?;
                (Some(name), ArgValue::Expr(rhs.expr()?))
            }
            2 => (None, ArgValue::List(rhs.list()?)),
            _ => return Err(unhandled(NonTerminal::Arg, id, span)),
        };
        Ok(ParseValue::Arg(ArgExpr {
            name,
            value,
            text: span.slice(self.source).to_string(),
            span,
        }))
    }

    // Rule 1 is a path that starts with a separator
    fn reduce_path(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let path = match id {
            0 => {
                let mut path = rhs.path()?;
                rhs.skip()?;
                let (segment, segment_span) = rhs.ident()?;
                path.push(&segment, segment_span);
                path
            }
            1 => {
                rhs.skip()?;
                let (segment, _) = rhs.ident()?;
                PathExpr::rooted(&segment, span)
            }
            2 => {
                let (segment, _) = rhs.ident()?;
                PathExpr::new(&segment, span)
            }
            _ => return Err(unhandled(NonTerminal::PathSpec, id, span)),
        };
        Ok(ParseValue::Path(path))
    }

    fn reduce_variable(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let node = match id {
            0 => {
                let (name, _) = rhs.ident()?;
                self.factory
                    .create_var(None, PathExpr::new(&name, span), true, span)
            }
            1 => {
                rhs.skip()?;
                let path = rhs.path()?;
                self.factory.create_var(None, path, false, span)
            }
            2 => {
                rhs.skip()?;
                let db = rhs.db()?;
                rhs.skip()?;
                let path = rhs.path()?;
                self.factory.create_var(Some(db), path, false, span)
            }
            _ => return Err(unhandled(NonTerminal::Variable, id, span)),
        };
        Ok(ParseValue::Expr(node))
    }

    fn reduce_db(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        let (file, machine, time) = match id {
            0 => (Some(rhs.path()?), None, None),
            1 => (Some(rhs.path()?), Some(rhs.mach()?), None),
            2 => (None, None, Some(rhs.time()?)),
            3 => (Some(rhs.path()?), None, Some(rhs.time()?)),
            4 => (Some(rhs.path()?), Some(rhs.mach()?), Some(rhs.time()?)),
            _ => return Err(unhandled(NonTerminal::DBSpec, id, span)),
        };
        Ok(ParseValue::Db(DbExpr {
            file,
            machine,
            time,
            span,
        }))
    }

    /// `[values]suffix`, `[values]` (cycles) or `[#values]` (indexes)
    fn reduce_time(&mut self, id: u32, mut rhs: Rhs, span: Span) -> SyntaxResult<ParseValue> {
        rhs.skip()?; // '['
        if id == 2 {
            rhs.skip()?; // '#'
        }
        let (elems, elems_span) = rhs.list_elems()?;
        rhs.skip()?; // ']'
        let values = ListExpr {
            elems,
            span: elems_span,
        };

        let (format, is_delta) = match id {
            0 => {
                let (suffix, suffix_span) = rhs.ident()?;
                TimeFormat::parse_suffix(&suffix).ok_or(SyntaxError::InvalidTimeFormat {
                    suffix,
                    span: suffix_span,
                })?
            }
            1 => (TimeFormat::Cycle, false),
            2 => (TimeFormat::Index, false),
            _ => return Err(unhandled(NonTerminal::TimeSpec, id, span)),
        };
        Ok(ParseValue::Time(TimeExpr {
            format,
            is_delta,
            values,
            span,
        }))
    }
}

fn unhandled(nonterminal: NonTerminal, rule: u32, span: Span) -> SyntaxError {
    SyntaxError::UnhandledReduction {
        nonterminal: nonterminal.to_string(),
        rule,
        span,
    }
}

impl<'a, F: ExprNodeFactory> Reduction for ExprReducer<'a, F> {
    type Token = Token;
    type Value = Reduced;
    type Error = SyntaxError;

    fn apply_rule(
        &mut self,
        rule: &Rule,
        elements: Vec<ParseElement>,
        span: Span,
    ) -> SyntaxResult<Reduced> {
        let name = self.grammar.dictionary().name(rule.lhs());
        let nonterminal = NonTerminal::from_name(name).ok_or_else(|| {
            SyntaxError::UnhandledReduction {
                nonterminal: name.to_string(),
                rule: rule.id(),
                span,
            }
        })?;
        let id = rule.id();

        // Left-recursive chains keep the parse stack shallow while the tree
        // grows one level per operator, so depth is bounded here as well.
        let children = elements
            .iter()
            .filter_map(|element| match element {
                Element::Value { value, .. } => Some(value.depth),
                Element::Token(_) => None,
            })
            .max()
            .unwrap_or(0);
        let depth = children + usize::from(adds_tree_level(nonterminal, id));
        if depth > self.max_tree_depth {
            return Err(SyntaxError::MaxTreeDepth {
                limit: self.max_tree_depth,
                span,
            });
        }

        let value = self.reduce(nonterminal, id, Rhs::new(elements), span)?;
        Ok(Reduced { value, depth })
    }
}

impl<'a, F: ExprNodeFactory> ExprReducer<'a, F> {
    fn reduce(
        &mut self,
        nonterminal: NonTerminal,
        id: u32,
        mut rhs: Rhs,
        span: Span,
    ) -> SyntaxResult<ParseValue> {
        match nonterminal {
            NonTerminal::Expr => self.reduce_expr(id, rhs, span),
            NonTerminal::Constant => self.reduce_constant(id, rhs, span),
            NonTerminal::Vector => self.reduce_vector(id, rhs, span),
            NonTerminal::List => {
                rhs.skip()?;
                let (elems, _) = rhs.list_elems()?;
                Ok(ParseValue::List(ListExpr { elems, span }))
            }
            NonTerminal::ListElems => match id {
                0 => {
                    let (mut elems, _) = rhs.list_elems()?;
                    rhs.skip()?;
                    elems.push(rhs.list_elem()?);
                    Ok(ParseValue::ListElems(elems))
                }
                1 => Ok(ParseValue::ListElems(vec![rhs.list_elem()?])),
                _ => Err(unhandled(nonterminal, id, span)),
            },
            NonTerminal::ListElem => {
                let begin = rhs.expr()?;
                let (end, stride) = match id {
                    0 => (None, None),
                    1 => {
                        rhs.skip()?;
                        (Some(rhs.expr()?), None)
                    }
                    2 => {
                        rhs.skip()?;
                        let end = rhs.expr()?;
                        rhs.skip()?;
                        (Some(end), Some(rhs.expr()?))
                    }
                    _ => return Err(unhandled(nonterminal, id, span)),
                };
                Ok(ParseValue::ListElem(ListElemExpr {
                    begin,
                    end,
                    stride,
                    span,
                }))
            }
            NonTerminal::Function => self.reduce_function(id, rhs, span),
            NonTerminal::Args => match id {
                0 => {
                    let (mut args, _) = rhs.args()?;
                    rhs.skip()?;
                    args.push(rhs.arg()?);
                    Ok(ParseValue::Args(args))
                }
                1 => Ok(ParseValue::Args(vec![rhs.arg()?])),
                _ => Err(unhandled(nonterminal, id, span)),
            },
            NonTerminal::Arg => self.reduce_arg(id, rhs, span),
            NonTerminal::PathSpec => self.reduce_path(id, rhs, span),
            NonTerminal::MultiSlash => Ok(ParseValue::MultiSlash),
            NonTerminal::Variable => self.reduce_variable(id, rhs, span),
            NonTerminal::DBSpec => self.reduce_db(id, rhs, span),
            NonTerminal::MachSpec => {
                rhs.skip()?;
                let (host, _) = rhs.ident()?;
                Ok(ParseValue::Mach(MachExpr { host, span }))
            }
            NonTerminal::TimeSpec => self.reduce_time(id, rhs, span),
        }
    }
}

/// Parser for expression text over the shared grammar
pub struct ExprParser<F = AstFactory> {
    grammar: Arc<Grammar>,
    factory: F,
    /// Limit on the driver's state stack
    max_depth: usize,
    /// Limit on expression nesting in the produced tree
    max_tree_depth: usize,
}

impl ExprParser<AstFactory> {
    /// Parser over the shared grammar, building an owned [`ExprNode`] tree
    pub fn new() -> SyntaxResult<Self> {
        Self::with_factory(AstFactory)
    }
}

impl<F: ExprNodeFactory> ExprParser<F> {
    /// Fails only if the shared grammar cannot be installed
    pub fn with_factory(factory: F) -> SyntaxResult<Self> {
        Ok(Self::with_grammar(expression_grammar()?, factory))
    }

    /// Use a specific grammar, e.g. one rebuilt from exported tables
    pub fn with_grammar(grammar: Arc<Grammar>, factory: F) -> Self {
        Self {
            grammar,
            factory,
            max_depth: MAX_PARSE_DEPTH,
            max_tree_depth: MAX_TREE_DEPTH,
        }
    }

    /// Limit the driver's state stack
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Lower the tree depth limit. It cannot be raised past the configured
    /// one, since compiling recurses once per level.
    pub fn with_max_tree_depth(mut self, limit: usize) -> Self {
        self.max_tree_depth = limit.min(MAX_TREE_DEPTH);
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse one expression into its tree
    pub fn parse(&mut self, text: &str) -> SyntaxResult<ExprNode> {
        let source = normalize(text);
        self.parse_normalized(&source)
    }

    /// Parse, reporting a failure to `sink` before returning it
    pub fn parse_reporting(
        &mut self,
        text: &str,
        sink: &mut dyn ErrorSink,
    ) -> SyntaxResult<ExprNode> {
        let source = normalize(text);
        self.parse_normalized(&source).map_err(|error| {
            sink.report(error.diagnostic(&source));
            error
        })
    }

    fn parse_normalized(&mut self, source: &str) -> SyntaxResult<ExprNode> {
        let tokens = LexicalAnalyzer::new().tokenize(source)?;
        let grammar = Arc::clone(&self.grammar);
        let mut driver = Parser::new(grammar.as_ref())?.with_max_depth(self.max_depth);
        let mut reducer = ExprReducer {
            grammar: grammar.as_ref(),
            factory: &mut self.factory,
            source,
            max_tree_depth: self.max_tree_depth,
        };

        for token in tokens.into_iter().filter(|t| !t.is_space()) {
            let at_end = token.is_eof();
            driver
                .parse_one_token(token, &mut reducer)
                .map_err(|error| if at_end { error.at_end_of_input() } else { error })?;
            if driver.accepted() {
                break;
            }
        }

        match driver.finish().map(|reduced| reduced.value) {
            Some(ParseValue::Expr(node)) => {
                log_debug!("Expression parsed", "root" => node.kind_name());
                Ok(node)
            }
            Some(other) => Err(mismatch("expression", &other)),
            None => Err(SyntaxError::internal("input ended without an accepted expression")),
        }
    }
}

/// Tabs and newlines become spaces so rendered errors stay on one line
pub fn normalize(text: &str) -> String {
    text.replace(|c: char| matches!(c, '\t' | '\n'), " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::syntax::sink::CollectingSink;
    use assert_matches::assert_matches;

    fn parse(text: &str) -> SyntaxResult<ExprNode> {
        ExprParser::new().unwrap().parse(text)
    }

    fn binary_parts(node: &ExprNode) -> (char, &ExprNode, &ExprNode) {
        match node {
            ExprNode::Binary {
                op, left, right, ..
            } => (*op, left, right),
            other => panic!("expected binary, got {}", other.kind_name()),
        }
    }

    fn var_name(node: &ExprNode) -> &str {
        match node {
            ExprNode::Var { path, .. } => &path.full_path,
            other => panic!("expected variable, got {}", other.kind_name()),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let node = parse("a+b*c").unwrap();
        let (op, left, right) = binary_parts(&node);
        assert_eq!(op, '+');
        assert_eq!(var_name(left), "a");
        let (inner, b, c) = binary_parts(right);
        assert_eq!(inner, '*');
        assert_eq!((var_name(b), var_name(c)), ("b", "c"));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let node = parse("a-b-c").unwrap();
        let (op, left, right) = binary_parts(&node);
        assert_eq!(op, '-');
        assert_eq!(var_name(right), "c");
        let (inner, a, b) = binary_parts(left);
        assert_eq!(inner, '-');
        assert_eq!((var_name(a), var_name(b)), ("a", "b"));
    }

    #[test]
    fn power_is_right_associative() {
        let node = parse("a^b^c").unwrap();
        let (_, left, right) = binary_parts(&node);
        assert_eq!(var_name(left), "a");
        let (inner, _, _) = binary_parts(right);
        assert_eq!(inner, '^');
    }

    #[test]
    fn and_binds_loosest() {
        let node = parse("a & b + c").unwrap();
        let (op, _, right) = binary_parts(&node);
        assert_eq!(op, '&');
        assert_eq!(binary_parts(right).0, '+');
    }

    #[test]
    fn negative_literals_fold() {
        assert_matches!(parse("-3").unwrap(), ExprNode::IntegerConst { value: -3, .. });
        assert_matches!(parse("-3.5").unwrap(), ExprNode::FloatConst { value, .. } if value == -3.5);
        assert_matches!(parse("-x").unwrap(), ExprNode::Unary { op: '-', .. });
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let node = parse("-a^2").unwrap();
        assert_matches!(node, ExprNode::Unary { ref operand, .. } if matches!(**operand, ExprNode::Binary { op: '^', .. }));
    }

    #[test]
    fn index_and_vector() {
        assert_matches!(parse("v[1]").unwrap(), ExprNode::Index { index: 1, .. });
        match parse("{a, b, c}").unwrap() {
            ExprNode::Vector { components, .. } => {
                let names: Vec<_> = components.iter().map(var_name).collect();
                assert_eq!(names, vec!["a", "b", "c"]);
            }
            other => panic!("expected vector, got {}", other.kind_name()),
        }
    }

    #[test]
    fn function_arguments_keep_their_text() {
        match parse("val4mat(x, \"1\", level=2, [1:3, 5])").unwrap() {
            ExprNode::Function { name, args, .. } => {
                assert_eq!(name, "val4mat");
                let args = args.unwrap();
                let texts: Vec<_> = args.args.iter().map(|a| a.text.as_str()).collect();
                assert_eq!(texts, vec!["x", "\"1\"", "level=2", "[1:3, 5]"]);
                assert_eq!(args.args[2].name.as_deref(), Some("level"));
                assert_matches!(&args.args[3].value, ArgValue::List(list) if list.elems.len() == 2 && list.elems[0].is_range());
            }
            other => panic!("expected function, got {}", other.kind_name()),
        }
        assert_matches!(parse("time()").unwrap(), ExprNode::Function { args: None, .. });
    }

    #[test]
    fn bracketed_paths_and_databases() {
        match parse("<mesh//coords/x>").unwrap() {
            ExprNode::Var {
                path, canonical, ..
            } => {
                assert_eq!(path.full_path, "mesh/coords/x");
                assert_eq!(path.basename, "x");
                assert!(!canonical);
            }
            other => panic!("expected variable, got {}", other.kind_name()),
        }

        match parse("<run.silo@host[3]dc:pressure>").unwrap() {
            ExprNode::Var {
                database: Some(db),
                path,
                ..
            } => {
                assert_eq!(path.full_path, "pressure");
                assert_eq!(db.file.unwrap().full_path, "run.silo");
                assert_eq!(db.machine.unwrap().host, "host");
                let time = db.time.unwrap();
                assert_eq!(time.format, TimeFormat::Cycle);
                assert!(time.is_delta);
            }
            other => panic!("expected database variable, got {}", other.kind_name()),
        }

        assert_matches!(
            parse("<[#0]:d>").unwrap(),
            ExprNode::Var { database: Some(DbExpr { time: Some(TimeExpr { format: TimeFormat::Index, .. }), .. }), .. }
        );
        assert_matches!(parse("x").unwrap(), ExprNode::Var { canonical: true, .. });
    }

    #[test]
    fn bad_time_suffix_points_at_identifier() {
        let err = parse("<[1]q:d>").unwrap_err();
        assert_matches!(err, SyntaxError::InvalidTimeFormat { ref suffix, span } if suffix == "q" && span.start.column == 5);
    }

    #[test]
    fn syntax_errors_are_positioned() {
        let err = parse("a + * b").unwrap_err();
        assert_matches!(err, SyntaxError::UnexpectedToken { span, .. } if span.start.column == 5);

        let err = parse("a +").unwrap_err();
        assert_matches!(err, SyntaxError::UnexpectedEnd { .. });

        let err = parse("a $ b").unwrap_err();
        assert_matches!(err, SyntaxError::Lexical(_));
    }

    #[test]
    fn tabs_and_newlines_are_spaces() {
        assert!(parse("a\t+\nb").is_ok());
        assert_eq!(normalize("a\tb\nc"), "a b c");
    }

    #[test]
    fn reporting_sends_rendered_error_to_sink() {
        let mut sink = CollectingSink::new();
        let result = ExprParser::new()
            .unwrap()
            .parse_reporting("sin(", &mut sink);
        assert!(result.is_err());
        assert_eq!(sink.diagnostics.len(), 1);
        assert!(sink.diagnostics[0].rendered.contains("sin(\n"));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let text = format!("{}x{}", "(".repeat(40), ")".repeat(40));
        let err = ExprParser::new()
            .unwrap()
            .with_max_depth(16)
            .parse(&text)
            .unwrap_err();
        assert_matches!(err, SyntaxError::MaxParseDepth { limit: 16, .. });
    }

    fn sum_chain(terms: usize) -> String {
        vec!["a"; terms].join("+")
    }

    #[test]
    fn long_sums_hit_the_tree_depth_limit() {
        let err = parse(&sum_chain(MAX_TREE_DEPTH + 10)).unwrap_err();
        assert_matches!(err, SyntaxError::MaxTreeDepth { limit, .. } if limit == MAX_TREE_DEPTH);
        assert_eq!(err.error_code(), codes::syntax::MAX_TREE_DEPTH);
    }

    #[test]
    fn sums_within_the_limit_parse() {
        // n terms nest n levels
        let node = parse(&sum_chain(MAX_TREE_DEPTH - 2)).unwrap();
        assert_matches!(node, ExprNode::Binary { op: '+', .. });
    }

    #[test]
    fn argument_lists_do_not_add_depth() {
        let text = format!("max({})", vec!["a"; 40].join(","));
        let result = ExprParser::new()
            .unwrap()
            .with_max_tree_depth(3)
            .parse(&text);
        assert!(result.is_ok());
    }

    #[test]
    fn tree_depth_limit_can_be_lowered() {
        let err = ExprParser::new()
            .unwrap()
            .with_max_tree_depth(8)
            .parse(&sum_chain(12))
            .unwrap_err();
        assert_matches!(err, SyntaxError::MaxTreeDepth { limit: 8, .. });

        let err = ExprParser::new()
            .unwrap()
            .with_max_tree_depth(8)
            .parse("-(-(-(-(-(-(-(-(a))))))))")
            .unwrap_err();
        assert_matches!(err, SyntaxError::MaxTreeDepth { limit: 8, .. });
    }

    #[test]
    fn tree_depth_limit_cannot_be_raised() {
        let err = ExprParser::new()
            .unwrap()
            .with_max_tree_depth(usize::MAX)
            .parse(&sum_chain(MAX_TREE_DEPTH + 10))
            .unwrap_err();
        assert_matches!(err, SyntaxError::MaxTreeDepth { limit, .. } if limit == MAX_TREE_DEPTH);
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "q_criterion(velocity) + {a,b}[0] * -2.5";
        assert_eq!(parse(text).unwrap(), parse(text).unwrap());
    }
}
