//! Expression AST
//!
//! [`ExprNode`] is what the compiler consumes. The other node types only live
//! during parsing: argument lists, ranges, paths and database specifications
//! end up inside a function or variable node, never on their own.
//!
//! Every node owns its children and carries the span of the source it was
//! reduced from.

use expr_grammar::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value-producing expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprNode {
    /// `left op right` for `+ - * / ^ % &`
    Binary {
        /// Operator character as written
        op: char,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
        span: Span,
    },
    /// Negation of anything but a numeric literal
    Unary {
        /// Always `-`; literals fold into negative constants instead
        op: char,
        operand: Box<ExprNode>,
        span: Span,
    },
    /// `operand[index]`
    Index {
        operand: Box<ExprNode>,
        /// Component number, zero based
        index: i64,
        span: Span,
    },
    /// `{x,y}` or `{x,y,z}`
    Vector {
        /// Two or three components in source order
        components: Vec<ExprNode>,
        span: Span,
    },
    IntegerConst {
        value: i64,
        span: Span,
    },
    FloatConst {
        value: f64,
        span: Span,
    },
    /// Quoted literal; the quotes are not part of `value`
    StringConst {
        value: String,
        span: Span,
    },
    BooleanConst {
        value: bool,
        span: Span,
    },
    /// `name(args)`
    Function {
        /// Name as written, aliases included
        name: String,
        /// `None` for an empty argument list
        args: Option<ArgsExpr>,
        span: Span,
    },
    /// A bare identifier or a `<...>` reference
    Var {
        /// Present for `<db:path>` references
        database: Option<DbExpr>,
        path: PathExpr,
        /// Set for a bare identifier, as opposed to a `<...>` reference
        canonical: bool,
        span: Span,
    },
}

impl ExprNode {
    /// Source covered by this node and its children
    pub fn span(&self) -> Span {
        match self {
            ExprNode::Binary { span, .. }
            | ExprNode::Unary { span, .. }
            | ExprNode::Index { span, .. }
            | ExprNode::Vector { span, .. }
            | ExprNode::IntegerConst { span, .. }
            | ExprNode::FloatConst { span, .. }
            | ExprNode::StringConst { span, .. }
            | ExprNode::BooleanConst { span, .. }
            | ExprNode::Function { span, .. }
            | ExprNode::Var { span, .. } => *span,
        }
    }

    /// Short name of the node kind for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExprNode::Binary { .. } => "BinaryExpr",
            ExprNode::Unary { .. } => "UnaryExpr",
            ExprNode::Index { .. } => "IndexExpr",
            ExprNode::Vector { .. } => "VectorExpr",
            ExprNode::IntegerConst { .. } => "IntegerConst",
            ExprNode::FloatConst { .. } => "FloatConst",
            ExprNode::StringConst { .. } => "StringConst",
            ExprNode::BooleanConst { .. } => "BooleanConst",
            ExprNode::Function { .. } => "FunctionExpr",
            ExprNode::Var { .. } => "VarExpr",
        }
    }

    /// Literal of any type, negative numbers included
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            ExprNode::IntegerConst { .. }
                | ExprNode::FloatConst { .. }
                | ExprNode::StringConst { .. }
                | ExprNode::BooleanConst { .. }
        )
    }
}

/// Indented tree dump
impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl ExprNode {
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            ExprNode::Binary {
                op, left, right, ..
            } => {
                writeln!(f, "{}Binary '{}'", indent, op)?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)
            }
            ExprNode::Unary { op, operand, .. } => {
                writeln!(f, "{}Unary '{}'", indent, op)?;
                operand.write_tree(f, depth + 1)
            }
            ExprNode::Index { operand, index, .. } => {
                writeln!(f, "{}Index [{}]", indent, index)?;
                operand.write_tree(f, depth + 1)
            }
            ExprNode::Vector { components, .. } => {
                writeln!(f, "{}Vector", indent)?;
                components
                    .iter()
                    .try_for_each(|c| c.write_tree(f, depth + 1))
            }
            ExprNode::IntegerConst { value, .. } => writeln!(f, "{}Integer {}", indent, value),
            ExprNode::FloatConst { value, .. } => writeln!(f, "{}Float {}", indent, value),
            ExprNode::StringConst { value, .. } => writeln!(f, "{}String {:?}", indent, value),
            ExprNode::BooleanConst { value, .. } => writeln!(f, "{}Bool {}", indent, value),
            ExprNode::Function { name, args, .. } => {
                writeln!(f, "{}Function {}", indent, name)?;
                if let Some(args) = args {
                    for arg in &args.args {
                        writeln!(f, "{}  Arg {}", indent, arg.text)?;
                    }
                }
                Ok(())
            }
            ExprNode::Var {
                database, path, ..
            } => match database {
                Some(db) => writeln!(f, "{}Var {}:{}", indent, db, path.full_path),
                None => writeln!(f, "{}Var {}", indent, path.full_path),
            },
        }
    }
}

/// `begin[:end[:stride]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListElemExpr {
    /// The single value, or the first value of a range
    pub begin: ExprNode,
    /// Last value of a range, inclusive
    pub end: Option<ExprNode>,
    /// Only set together with `end`
    pub stride: Option<ExprNode>,
    pub span: Span,
}

impl ListElemExpr {
    /// `begin:end` or `begin:end:stride`
    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }
}

/// `[elem, elem, ...]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListExpr {
    /// At least one element, in source order
    pub elems: Vec<ListElemExpr>,
    pub span: Span,
}

/// What an argument holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Expr(ExprNode),
    /// `[...]`, only meaningful to filters that read extra arguments
    List(ListExpr),
}

/// One function argument with its source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgExpr {
    /// Present for `name=expr`
    pub name: Option<String>,
    pub value: ArgValue,
    /// Source text of the whole argument, used for names and extra arguments
    pub text: String,
    pub span: Span,
}

impl ArgExpr {
    /// The expression this argument evaluates, if it is not a list
    pub fn expr(&self) -> Option<&ExprNode> {
        match &self.value {
            ArgValue::Expr(expr) => Some(expr),
            ArgValue::List(_) => None,
        }
    }

    /// Positional expression argument
    pub fn is_plain_expr(&self) -> bool {
        self.name.is_none() && matches!(self.value, ArgValue::Expr(_))
    }
}

/// The argument list of a function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgsExpr {
    /// Arguments in source order
    pub args: Vec<ArgExpr>,
    pub span: Span,
}

impl ArgsExpr {
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A slash-separated variable or file path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathExpr {
    /// Segments joined by `/`, with a leading `/` when the source had one
    pub full_path: String,
    /// Last segment
    pub basename: String,
    pub span: Span,
}

impl PathExpr {
    /// Single-segment path
    pub fn new(segment: &str, span: Span) -> Self {
        Self {
            full_path: segment.to_string(),
            basename: segment.to_string(),
            span,
        }
    }

    /// `/segment`, for paths starting with a separator
    pub fn rooted(segment: &str, span: Span) -> Self {
        Self {
            full_path: format!("/{}", segment),
            basename: segment.to_string(),
            span,
        }
    }

    /// Append `/segment`; runs of separators collapse to one
    pub fn push(&mut self, segment: &str, span: Span) {
        self.full_path.push('/');
        self.full_path.push_str(segment);
        self.basename = segment.to_string();
        self.span = self.span.merge(span);
    }
}

/// `@host`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachExpr {
    /// Host name without the `@`
    pub host: String,
    pub span: Span,
}

/// How the values of a time qualifier are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFormat {
    /// Simulation cycle numbers; the default with no suffix
    Cycle,
    /// Simulation times
    Time,
    /// Time-state indexes; `[#...]` is shorthand for this
    Index,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cycle => "cycle",
            Self::Time => "time",
            Self::Index => "index",
        }
    }

    /// Parse a time-spec suffix: `c`, `t` or `i` with an optional `d`
    /// before or after it, any case. Returns the format and delta flag.
    pub fn parse_suffix(suffix: &str) -> Option<(Self, bool)> {
        let lower = suffix.to_ascii_lowercase();
        let (letter, delta) = match lower.as_str() {
            s if s.len() == 1 => (s, false),
            s if s.len() == 2 && s.starts_with('d') => (&s[1..], true),
            s if s.len() == 2 && s.ends_with('d') => (&s[..1], true),
            _ => return None,
        };
        let format = match letter {
            "c" => Self::Cycle,
            "t" => Self::Time,
            "i" => Self::Index,
            _ => return None,
        };
        Some((format, delta))
    }
}

/// `[values]suffix`, `[values]` or `[#values]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeExpr {
    pub format: TimeFormat,
    /// Values are offsets from the current time state
    pub is_delta: bool,
    pub values: ListExpr,
    pub span: Span,
}

/// Database qualifier of a `<db:path>` variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbExpr {
    /// Database file; absent for a time-only qualifier like `<[0]:p>`
    pub file: Option<PathExpr>,
    pub machine: Option<MachExpr>,
    pub time: Option<TimeExpr>,
    pub span: Span,
}

impl fmt::Display for DbExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}", file.full_path)?;
        }
        if let Some(machine) = &self.machine {
            write!(f, "@{}", machine.host)?;
        }
        if let Some(time) = &self.time {
            write!(
                f,
                "[{} {}{}]",
                time.values.elems.len(),
                time.format.as_str(),
                if time.is_delta { " delta" } else { "" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr_grammar::Position;

    fn span(from: u32, to: u32) -> Span {
        Span::new(
            Position::new(from as usize - 1, from),
            Position::new(to as usize - 1, to),
        )
    }

    #[test]
    fn time_suffixes() {
        assert_eq!(TimeFormat::parse_suffix("c"), Some((TimeFormat::Cycle, false)));
        assert_eq!(TimeFormat::parse_suffix("T"), Some((TimeFormat::Time, false)));
        assert_eq!(TimeFormat::parse_suffix("di"), Some((TimeFormat::Index, true)));
        assert_eq!(TimeFormat::parse_suffix("CD"), Some((TimeFormat::Cycle, true)));
        assert_eq!(TimeFormat::parse_suffix("x"), None);
        assert_eq!(TimeFormat::parse_suffix("dd"), None);
        assert_eq!(TimeFormat::parse_suffix("cycle"), None);
    }

    #[test]
    fn paths_join_with_single_separator() {
        let mut path = PathExpr::rooted("mesh", span(2, 6));
        path.push("pressure", span(7, 15));
        assert_eq!(path.full_path, "/mesh/pressure");
        assert_eq!(path.basename, "pressure");
        assert_eq!(path.span.start.column, 2);
        assert_eq!(path.span.end.column, 15);
    }

    #[test]
    fn node_span_and_kind() {
        let node = ExprNode::Binary {
            op: '+',
            left: Box::new(ExprNode::IntegerConst { value: 1, span: span(1, 2) }),
            right: Box::new(ExprNode::IntegerConst { value: 2, span: span(3, 4) }),
            span: span(1, 4),
        };
        assert_eq!(node.kind_name(), "BinaryExpr");
        assert_eq!(node.span(), span(1, 4));
        let dump = node.to_string();
        assert!(dump.starts_with("Binary '+'\n  Integer 1\n"));
    }
}
