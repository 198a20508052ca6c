//! Error and success codes with their classification metadata
//!
//! Every error type in the crate maps to one [`Code`] through its
//! `error_code()` method. The metadata registry drives severity, category
//! and recovery decisions in the collector and the CLI.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const IO_ERROR: Code = Code::new("ERR003");
}

/// Scanner error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E025");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Parser error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const UNEXPECTED_END: Code = Code::new("E051");
    pub const INVALID_TIME_FORMAT: Code = Code::new("E052");
    pub const UNHANDLED_REDUCTION: Code = Code::new("E053");
    pub const MAX_PARSE_DEPTH: Code = Code::new("E087");
    pub const MAX_TREE_DEPTH: Code = Code::new("E088");
    pub const INTERNAL_PARSER_ERROR: Code = Code::new("E086");
}

/// Grammar construction error codes
pub mod grammar {
    use super::Code;

    pub const GRAMMAR_CONFLICT: Code = Code::new("G001");
    pub const UNKNOWN_SYMBOL: Code = Code::new("G002");
    pub const MISSING_START_SYMBOL: Code = Code::new("G003");
    pub const NOT_CONFIGURED: Code = Code::new("G004");
    pub const INVALID_TABLES: Code = Code::new("G005");
}

/// Pipeline compilation error codes
pub mod compile {
    use super::Code;

    pub const UNSUPPORTED_CONSTANT: Code = Code::new("E180");
    pub const UNKNOWN_OPERATOR: Code = Code::new("E181");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E182");
    pub const ARGUMENT_UNDERFLOW: Code = Code::new("E183");
    pub const LIST_AS_VARIABLE: Code = Code::new("E184");
    pub const UNSUPPORTED_FILTER: Code = Code::new("E185");
    pub const LIMIT_EXCEEDED: Code = Code::new("E186");
    pub const STACK_IMBALANCE: Code = Code::new("E187");
}

/// Definition file and batch error codes
pub mod batch {
    use super::Code;

    pub const DEFINITION_SYNTAX: Code = Code::new("B001");
    pub const DUPLICATE_DEFINITION: Code = Code::new("B002");
    pub const DEFINITION_FILE_TOO_LARGE: Code = Code::new("B003");
    pub const BATCH_TOO_LARGE: Code = Code::new("B004");
    pub const WORKER_FAILURE: Code = Code::new("B005");
    pub const EXPRESSION_FAILED: Code = Code::new("B006");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const GRAMMAR_CONFIGURED: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSE_COMPLETE: Code = Code::new("I040");
    pub const COMPILE_COMPLETE: Code = Code::new("I070");
    pub const DEFINITIONS_LOADED: Code = Code::new("I080");
    pub const BATCH_COMPLETE: Code = Code::new("I081");
}

macro_rules! metadata {
    ($code:expr, $category:expr, $severity:ident, $recoverable:expr, $halt:expr, $description:expr, $action:expr) => {
        ErrorMetadata {
            code: $code.as_str(),
            category: $category,
            severity: Severity::$severity,
            recoverable: $recoverable,
            requires_halt: $halt,
            description: $description,
            recommended_action: $action,
        }
    };
}

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            metadata!(system::INTERNAL_ERROR, "System", Critical, false, true,
                "Internal compiler error", "File a bug report with the failing expression"),
            metadata!(system::INITIALIZATION_FAILURE, "System", Critical, false, true,
                "Compiler initialization failed", "Check logging and grammar configuration"),
            metadata!(system::IO_ERROR, "System", High, false, true,
                "Input/output failure", "Check that the path exists and is readable"),
            // Lexical
            metadata!(lexical::INVALID_CHARACTER, "Lexical", Medium, true, false,
                "Character not valid in an expression", "Remove or quote the character"),
            metadata!(lexical::UNTERMINATED_STRING, "Lexical", Medium, true, false,
                "String literal has no closing quote", "Close the string with a matching quote"),
            metadata!(lexical::INVALID_NUMBER, "Lexical", Medium, true, false,
                "Malformed numeric literal", "Check digits and exponent"),
            metadata!(lexical::IDENTIFIER_TOO_LONG, "Lexical", Low, true, false,
                "Identifier exceeds the configured length", "Shorten the identifier"),
            metadata!(lexical::STRING_TOO_LARGE, "Lexical", Low, true, false,
                "String literal exceeds the configured size", "Shorten the string"),
            metadata!(lexical::EXPRESSION_TOO_LONG, "Lexical", Medium, false, true,
                "Expression exceeds the configured length", "Split the expression into definitions"),
            metadata!(lexical::TOO_MANY_TOKENS, "Lexical", High, false, true,
                "Expression produced too many tokens", "Split the expression into definitions"),
            // Syntax
            metadata!(syntax::UNEXPECTED_TOKEN, "Syntax", Medium, true, false,
                "Token not allowed at this position", "Check operators and parentheses"),
            metadata!(syntax::UNEXPECTED_END, "Syntax", Medium, true, false,
                "Expression ended early", "Complete the expression"),
            metadata!(syntax::INVALID_TIME_FORMAT, "Syntax", Low, true, false,
                "Time specifier format is not i, c or t", "Use 'i', 'c' or 't' with an optional 'd'"),
            metadata!(syntax::UNHANDLED_REDUCTION, "Syntax", Critical, false, true,
                "Grammar rule has no reduction handler", "File a bug report"),
            metadata!(syntax::MAX_PARSE_DEPTH, "Syntax", High, false, true,
                "Expression nesting exceeds the parse stack limit", "Reduce nesting depth"),
            metadata!(syntax::MAX_TREE_DEPTH, "Syntax", High, false, true,
                "Expression nests deeper than the tree depth limit", "Split the expression into definitions"),
            metadata!(syntax::INTERNAL_PARSER_ERROR, "Syntax", Critical, false, true,
                "Parser tables are inconsistent", "File a bug report"),
            // Grammar
            metadata!(grammar::GRAMMAR_CONFLICT, "Grammar", Critical, false, true,
                "Grammar has unresolved conflicts", "Add precedence or associativity declarations"),
            metadata!(grammar::UNKNOWN_SYMBOL, "Grammar", Critical, false, true,
                "Rule or table refers to an unknown symbol", "Intern every symbol before use"),
            metadata!(grammar::MISSING_START_SYMBOL, "Grammar", Critical, false, true,
                "Grammar has no start symbol", "Set the start symbol before configuring"),
            metadata!(grammar::NOT_CONFIGURED, "Grammar", Critical, false, true,
                "Grammar used before configuration", "Configure the grammar first"),
            metadata!(grammar::INVALID_TABLES, "Grammar", Critical, false, true,
                "Installed tables do not match the grammar", "Regenerate the tables"),
            // Compile
            metadata!(compile::UNSUPPORTED_CONSTANT, "Compile", Medium, true, false,
                "Constant type cannot be turned into a filter", "Use numeric constants"),
            metadata!(compile::UNKNOWN_OPERATOR, "Compile", Medium, true, false,
                "Operator has no filter", "Use a supported operator"),
            metadata!(compile::UNKNOWN_FUNCTION, "Compile", Medium, true, false,
                "Function name is not registered", "Check the function name"),
            metadata!(compile::ARGUMENT_UNDERFLOW, "Compile", Medium, true, false,
                "Function given fewer arguments than it expects", "Supply all required arguments"),
            metadata!(compile::LIST_AS_VARIABLE, "Compile", Medium, true, false,
                "List given where a variable argument is expected", "Pass an expression instead"),
            metadata!(compile::UNSUPPORTED_FILTER, "Compile", Medium, true, false,
                "Filter is not available in this build", "Use a different function"),
            metadata!(compile::LIMIT_EXCEEDED, "Compile", High, false, true,
                "Compilation exceeded a configured limit", "Simplify the expression"),
            metadata!(compile::STACK_IMBALANCE, "Compile", Critical, false, true,
                "Filter consumed or produced the wrong number of names", "File a bug report"),
            // Batch
            metadata!(batch::DEFINITION_SYNTAX, "Batch", Medium, true, false,
                "Definition line is not of the form name = expression", "Fix the definition line"),
            metadata!(batch::DUPLICATE_DEFINITION, "Batch", Medium, true, false,
                "Expression name defined twice", "Rename or remove one definition"),
            metadata!(batch::DEFINITION_FILE_TOO_LARGE, "Batch", High, false, true,
                "Definition file exceeds the configured size", "Split the file"),
            metadata!(batch::BATCH_TOO_LARGE, "Batch", High, false, true,
                "Too many expressions in one batch", "Split the batch"),
            metadata!(batch::WORKER_FAILURE, "Batch", Critical, false, true,
                "Batch worker thread failed", "Retry with fewer threads"),
            metadata!(batch::EXPRESSION_FAILED, "Batch", Medium, true, false,
                "Expression in batch failed to compile", "See the expression's own error"),
            // Success
            metadata!(success::OPERATION_COMPLETED_SUCCESSFULLY, "Success", Low, true, false,
                "Operation completed", "None"),
            metadata!(success::SYSTEM_INITIALIZATION_COMPLETED, "Success", Low, true, false,
                "Initialization completed", "None"),
            metadata!(success::GRAMMAR_CONFIGURED, "Success", Low, true, false,
                "Grammar configured without conflicts", "None"),
            metadata!(success::TOKENIZATION_COMPLETE, "Success", Low, true, false,
                "Scanning completed", "None"),
            metadata!(success::PARSE_COMPLETE, "Success", Low, true, false,
                "Parse completed", "None"),
            metadata!(success::COMPILE_COMPLETE, "Success", Low, true, false,
                "Filter pipeline built", "None"),
            metadata!(success::DEFINITIONS_LOADED, "Success", Low, true, false,
                "Definition file loaded", "None"),
            metadata!(success::BATCH_COMPLETE, "Success", Low, true, false,
                "Batch compilation finished", "None"),
        ];
        entries.into_iter().map(|m| (m.code, m)).collect()
    })
}

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_code_has_metadata() {
        for code in [
            lexical::INVALID_CHARACTER,
            syntax::UNEXPECTED_TOKEN,
            syntax::MAX_TREE_DEPTH,
            grammar::GRAMMAR_CONFLICT,
            compile::ARGUMENT_UNDERFLOW,
            batch::DUPLICATE_DEFINITION,
            success::COMPILE_COMPLETE,
        ] {
            assert!(get_error_metadata(code.as_str()).is_some(), "{} missing", code);
        }
    }

    #[test]
    fn classification_follows_registry() {
        assert_eq!(get_category(grammar::GRAMMAR_CONFLICT.as_str()), "Grammar");
        assert!(requires_halt(grammar::GRAMMAR_CONFLICT.as_str()));
        assert!(is_recoverable(compile::UNKNOWN_FUNCTION.as_str()));
        assert_eq!(get_severity(system::INTERNAL_ERROR.as_str()), Severity::Critical);
    }

    #[test]
    fn unknown_codes_use_defaults() {
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(!requires_halt("Z999"));
    }
}
