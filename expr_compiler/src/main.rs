use expr_compiler::batch::{self, BatchConfig, BatchResults};
use expr_compiler::definitions::{load_definitions, DefinitionSet};
use expr_compiler::grammar::expression_grammar;
use expr_compiler::logging;
use expr_compiler::pipeline::{CompiledExpression, ExpressionCompiler};
use expr_compiler::syntax::{normalize, sink_for};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Rust,
    Json,
}

#[derive(Debug)]
struct CliOptions {
    expressions: Vec<String>,
    file: Option<PathBuf>,
    print_grammar: bool,
    emit_tables: Option<TableFormat>,
    batch: BatchConfig,
    json: bool,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_global_logging()?;

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("exprc");
    let options = match parse_args(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("       {} --help", program);
            std::process::exit(2);
        }
    };

    if options.help {
        print_help(program);
        return Ok(());
    }

    let nothing_to_do = options.expressions.is_empty()
        && options.file.is_none()
        && !options.print_grammar
        && options.emit_tables.is_none();
    if nothing_to_do {
        eprintln!("Usage: {} [options] <expression>...", program);
        eprintln!("       {} --help", program);
        std::process::exit(2);
    }

    if options.print_grammar || logging::config::print_grammar_report() {
        print!("{}", expression_grammar()?);
    }

    if let Some(format) = options.emit_tables {
        let grammar = expression_grammar()?;
        match format {
            TableFormat::Rust => print!("{}", grammar.emit_rust_tables("expression_tables")?),
            TableFormat::Json => println!("{}", grammar.tables()?.to_json()?),
        }
    }

    let mut failed = false;
    if !options.expressions.is_empty() {
        failed |= !compile_expressions(&options.expressions, options.json)?;
    }
    if let Some(path) = &options.file {
        failed |= !compile_definition_file(path, &options.batch, options.json);
    }

    if failed {
        logging::print_cargo_style_summary();
        std::process::exit(1);
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        expressions: Vec::new(),
        file: None,
        print_grammar: false,
        emit_tables: None,
        batch: BatchConfig::default(),
        json: false,
        help: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--print-grammar" => options.print_grammar = true,
            "--json" => options.json = true,
            "--fail-fast" => options.batch.fail_fast = true,
            "--file" => {
                let path = iter.next().ok_or("--file requires a path")?;
                options.file = Some(PathBuf::from(path));
            }
            "--emit-tables" => {
                let format = iter.next().ok_or("--emit-tables requires rust or json")?;
                options.emit_tables = Some(match format.as_str() {
                    "rust" => TableFormat::Rust,
                    "json" => TableFormat::Json,
                    other => return Err(format!("unknown table format '{}'", other)),
                });
            }
            "--threads" => {
                let value = iter.next().ok_or("--threads requires a number")?;
                let threads: usize = value
                    .parse()
                    .map_err(|_| format!("invalid thread count '{}'", value))?;
                options.batch.max_threads = threads.max(1);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{}'", other));
            }
            expression => options.expressions.push(expression.to_string()),
        }
    }
    Ok(options)
}

fn print_help(program: &str) {
    println!("exprc v{}", env!("CARGO_PKG_VERSION"));
    println!("Compile expressions into filter pipelines");
    println!();
    println!("USAGE:");
    println!("    {} [options] <expression>...", program);
    println!("    {} --file <definitions> [options]", program);
    println!();
    println!("OPTIONS:");
    println!("    --file <path>           Compile every definition in a file (name = expression)");
    println!("    --print-grammar         Print the grammar rules and parser states");
    println!("    --emit-tables rust|json Print the configured parse tables");
    println!("    --threads <n>           Worker threads for --file (default: auto)");
    println!("    --fail-fast             Stop a batch at the first failure");
    println!("    --json                  Print compiled pipelines as JSON");
    println!("    --help                  Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    EXPR_ERROR_TARGET       console | log | silent");
    println!("    EXPR_LOGGING_MIN_LEVEL  error | warn | info | debug");
    println!("    EXPR_LOGGING_FILE       append log events to this file");
    println!("    EXPR_PRINT_GRAMMAR      true to print the grammar on startup");
    println!();
    println!("EXAMPLES:");
    println!("    {} 'a + b * c'", program);
    println!("    {} --json 'magnitude(velocity) * 2'", program);
    println!("    {} --file derived.txt --threads 4 --fail-fast", program);
}

/// Compile command-line expressions; false if any failed
fn compile_expressions(
    expressions: &[String],
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut compiler = ExpressionCompiler::new()?;
    let mut sink = sink_for(logging::config::error_target());
    let mut all_ok = true;
    for (index, text) in expressions.iter().enumerate() {
        let name = format!("arg{}", index + 1);
        let result = logging::with_expression_context(&name, index, || {
            compiler.compile_reporting(text, sink.as_mut())
        });
        match result {
            Ok(compiled) => print_compiled(&compiled, json)?,
            Err(_) => all_ok = false,
        }
    }
    Ok(all_ok)
}

/// Compile a definition file in batch; false if anything failed
fn compile_definition_file(path: &PathBuf, config: &BatchConfig, json: bool) -> bool {
    let definitions = match load_definitions(path) {
        Ok(definitions) => definitions,
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            return false;
        }
    };
    match batch::compile_definitions(&definitions, config) {
        Ok(results) => {
            print_batch_results(&definitions, &results, json);
            results.failure_count() == 0
        }
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            false
        }
    }
}

fn print_compiled(compiled: &CompiledExpression, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", compiled.to_json()?);
    } else {
        print!("{}", compiled);
    }
    Ok(())
}

fn print_batch_results(definitions: &DefinitionSet, results: &BatchResults, json: bool) {
    for (name, compiled) in &results.successful {
        if json {
            match compiled.to_json() {
                Ok(text) => println!("{}", text),
                Err(error) => eprintln!("{}: {}", name, error),
            }
        } else {
            println!("{} = {}", name, compiled);
        }
    }
    for (name, error) in &results.failed {
        let source = definitions
            .get(name)
            .map(|d| normalize(&d.expression))
            .unwrap_or_default();
        eprintln!("error[{}] in {}: {}", error.error_code(), name, error.render(&source));
    }
    println!("{}", results.summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn expressions_and_flags() {
        let options =
            parse_args(&args(&["--json", "a+b", "--threads", "3", "--fail-fast", "-c"])).unwrap();
        assert_eq!(options.expressions, vec!["a+b", "-c"]);
        assert!(options.json);
        assert_eq!(options.batch.max_threads, 3);
        assert!(options.batch.fail_fast);
    }

    #[test]
    fn table_formats() {
        let options = parse_args(&args(&["--emit-tables", "json"])).unwrap();
        assert_eq!(options.emit_tables, Some(TableFormat::Json));
        assert!(parse_args(&args(&["--emit-tables", "xml"])).is_err());
        assert!(parse_args(&args(&["--emit-tables"])).is_err());
    }

    #[test]
    fn file_and_errors() {
        let options = parse_args(&args(&["--file", "defs.txt"])).unwrap();
        assert_eq!(options.file, Some(PathBuf::from("defs.txt")));
        assert!(parse_args(&args(&["--threads", "many"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}
