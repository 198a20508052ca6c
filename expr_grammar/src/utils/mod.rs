//! Shared source-location helpers

pub mod span;

pub use span::{Position, Span};
