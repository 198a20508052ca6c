// build.rs - TOML-driven compile-time limits and generated parse tables
use std::env;
use std::fs;
use std::path::Path;

// Grammar sources shared with the library
#[allow(dead_code)]
#[path = "src/tokens/terminal.rs"]
mod terminal;
#[allow(dead_code)]
#[path = "src/grammar/nonterminals.rs"]
mod nonterminals;
#[allow(dead_code)]
#[path = "src/grammar/rules.rs"]
mod rules;

const GRAMMAR_SOURCES: [&str; 3] = [
    "src/tokens/terminal.rs",
    "src/grammar/nonterminals.rs",
    "src/grammar/rules.rs",
];

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    compile: CompileLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_expression_length: usize,
    max_token_count: usize,
    max_identifier_length: usize,
    max_string_size: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_tree_depth: usize,
}

#[derive(serde::Deserialize)]
struct CompileLimits {
    max_name_stack_depth: usize,
    max_function_arguments: usize,
    max_filters_per_expression: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_expressions_per_batch: usize,
    max_definition_file_size: u64,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_expression: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=EXPR_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=EXPR_CONFIG_DIR");

    let profile = env::var("EXPR_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("EXPR_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of expr_compiler
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
    generate_tables();
}

fn generate_tables() {
    for source in GRAMMAR_SOURCES {
        println!("cargo:rerun-if-changed={}", source);
    }

    let mut grammar = rules::build_expression_grammar();
    if let Err(error) = grammar.configure() {
        panic!("GRAMMAR: {}", error);
    }
    let source = grammar
        .emit_rust_tables("expression_tables")
        .unwrap_or_else(|e| panic!("GRAMMAR: {}", e));

    let out_dir = env::var("OUT_DIR").unwrap();
    fs::write(Path::new(&out_dir).join("expression_tables.rs"), source).unwrap();
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_WORKERS: usize = 256;
    const ABSOLUTE_MAX_DEFINITION_FILE: u64 = 100_000_000;
    // Compiling recurses once per level on a default 2 MiB thread stack
    const ABSOLUTE_MAX_TREE_DEPTH: usize = 2048;

    if config.lexical.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH {
        panic!("LIMITS: max_expression_length exceeds absolute maximum");
    }

    if config.lexical.max_string_size > config.lexical.max_expression_length {
        panic!("LIMITS: max_string_size cannot exceed max_expression_length");
    }

    if config.syntax.max_tree_depth == 0 || config.syntax.max_tree_depth > ABSOLUTE_MAX_TREE_DEPTH {
        panic!("LIMITS: max_tree_depth must be within 1..={}", ABSOLUTE_MAX_TREE_DEPTH);
    }

    if config.syntax.max_parse_depth == 0 || config.compile.max_name_stack_depth == 0 {
        panic!("LIMITS: parse and name stack depths must be positive");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKERS
    {
        panic!("LIMITS: max_worker_threads must be within 1..={}", ABSOLUTE_MAX_WORKERS);
    }

    if config.batch_processing.max_definition_file_size > ABSOLUTE_MAX_DEFINITION_FILE {
        panic!("LIMITS: max_definition_file_size exceeds absolute maximum");
    }

    if profile == "production" && config.lexical.max_expression_length > 65_536 {
        panic!("PRODUCTION: max_expression_length too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_STRING_SIZE: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_TREE_DEPTH: usize = {};
    }}

    pub mod compile {{
        pub const MAX_NAME_STACK_DEPTH: usize = {};
        pub const MAX_FUNCTION_ARGUMENTS: usize = {};
        pub const MAX_FILTERS_PER_EXPRESSION: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_EXPRESSIONS_PER_BATCH: usize = {};
        pub const MAX_DEFINITION_FILE_SIZE: u64 = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_EXPRESSION: usize = {};
    }}
}}
"#,
        profile,
        // Lexical
        config.lexical.max_expression_length,
        config.lexical.max_token_count,
        config.lexical.max_identifier_length,
        config.lexical.max_string_size,
        // Syntax
        config.syntax.max_parse_depth,
        config.syntax.max_tree_depth,
        // Compile
        config.compile.max_name_stack_depth,
        config.compile.max_function_arguments,
        config.compile.max_filters_per_expression,
        // Batch
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_expressions_per_batch,
        config.batch_processing.max_definition_file_size,
        // Logging
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_expression,
    );

    fs::write(output_path, constants_code).unwrap();
}
