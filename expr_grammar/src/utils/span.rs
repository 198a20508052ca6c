//! Source location tracking for expression text
//!
//! Expressions are single logical lines, so a position is a byte offset plus
//! a 1-based column. Spans render as the source line followed by a caret
//! underline for user-facing diagnostics.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Column number (1-based, counted in characters)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, column: u32) -> Self {
        Self { offset, column }
    }

    /// The first character of the input
    pub fn start() -> Self {
        Self {
            offset: 0,
            column: 1,
        }
    }

    /// Advance past one character
    pub fn advance(self, ch: char) -> Self {
        Self {
            offset: self.offset + ch.len_utf8(),
            column: self.column + 1,
        }
    }

    /// Advance past a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.column)
    }
}

/// A half-open span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Zero-width span at a position
    pub fn empty_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Source text covered by this span; empty if the span lies outside `input`.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start.offset..self.end.offset).unwrap_or("")
    }

    /// Render the source followed by a caret line under this span.
    ///
    /// ```text
    /// a + * b
    ///     ^
    /// ```
    pub fn error_text(&self, source: &str) -> String {
        let indent = (self.start.column.max(1) - 1) as usize;
        let width = source
            .get(self.start.offset..self.end.offset)
            .map(|s| s.chars().count())
            .unwrap_or(0)
            .max(1);
        format!("{}\n{}{}", source, " ".repeat(indent), "^".repeat(width))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end.column > self.start.column + 1 {
            write!(f, "columns {}-{}", self.start.column, self.end.column - 1)
        } else {
            write!(f, "column {}", self.start.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_of(source: &str, from: usize, to: usize) -> Span {
        let start = Position::start().advance_str(&source[..from]);
        let end = start.advance_str(&source[from..to]);
        Span::new(start, end)
    }

    #[test]
    fn test_merge_covers_both() {
        let src = "abc + def";
        let merged = span_of(src, 0, 3).merge(span_of(src, 6, 9));
        assert_eq!(merged.slice(src), "abc + def");
        assert_eq!(merged.len(), 9);
    }

    #[test]
    fn test_error_text_underlines_span() {
        let src = "a + * b";
        let text = span_of(src, 4, 5).error_text(src);
        assert_eq!(text, "a + * b\n    ^");
    }

    #[test]
    fn test_error_text_for_empty_span_has_one_caret() {
        let src = "sin(";
        let end = Position::start().advance_str(src);
        assert_eq!(Span::empty_at(end).error_text(src), "sin(\n    ^");
    }

    #[test]
    fn test_display() {
        let src = "abc";
        assert_eq!(span_of(src, 0, 3).to_string(), "columns 1-3");
        assert_eq!(span_of(src, 1, 2).to_string(), "column 2");
    }
}
