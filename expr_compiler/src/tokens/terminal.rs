//! Terminal codes of the token classes

use expr_grammar::{TerminalCode, EOF_CODE};

pub const EOF: TerminalCode = EOF_CODE;
pub const IDENTIFIER: TerminalCode = EOF_CODE + 1;
pub const INTEGER: TerminalCode = EOF_CODE + 2;
pub const FLOAT: TerminalCode = EOF_CODE + 3;
pub const STRING: TerminalCode = EOF_CODE + 4;
pub const BOOL: TerminalCode = EOF_CODE + 5;
pub const SPACE: TerminalCode = EOF_CODE + 6;

/// Punctuation recognized by the scanner
pub const PUNCTUATION: &[char] = &[
    '+', '-', '*', '/', '^', '&', '%', '(', ')', '[', ']', '{', '}', ',', ':', '<', '>',
    '@', '#', '=', '\\',
];
