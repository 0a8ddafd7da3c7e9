pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use crate::error::ErrorReporter;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use crate::token::Token;

/// Process exit codes, byte-exact per `spec.md` §6.
pub const EXIT_OK: i32 = 0;
pub const EXIT_DATA_ERROR: i32 = 65;
pub const EXIT_SOFTWARE_ERROR: i32 = 70;

pub fn tokenize_source(source: &str) -> (Vec<Token>, bool) {
    let reporter = ErrorReporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    (tokens, reporter.had_error())
}

/// Scans and parses a full program without resolving or running it. Used
/// by the `ast` subcommand and by `run_source` as its first two stages.
pub fn parse_source(source: &str) -> (Vec<Stmt>, bool) {
    let reporter = ErrorReporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    let statements = Parser::new(tokens, &reporter).parse();
    (statements, reporter.had_error())
}

/// Scans and parses a single expression, for the `parse`/`evaluate`
/// subcommands, which operate on one expression rather than a program
/// (matching the teacher's `evaluate`, which intentionally skips static
/// resolution since it has no enclosing program).
pub fn parse_expression_source(source: &str) -> Option<crate::expr::Expr> {
    let reporter = ErrorReporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    let mut parser = Parser::new(tokens, &reporter);
    if reporter.had_error() {
        return None;
    }
    parser.parse_expression().ok()
}

/// The full pipeline: scan, parse, resolve, interpret. Returns the process
/// exit code per `spec.md` §6 (0 / 65 / 70); 65 short-circuits before the
/// interpreter ever runs.
pub fn run_source(source: &str) -> i32 {
    let reporter = ErrorReporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    let statements = Parser::new(tokens, &reporter).parse();
    if reporter.had_error() {
        return EXIT_DATA_ERROR;
    }

    let locals = Resolver::new(&reporter).resolve(&statements);
    if reporter.had_error() {
        return EXIT_DATA_ERROR;
    }

    let mut interpreter = Interpreter::new(locals);
    match interpreter.interpret(&statements) {
        Ok(()) => EXIT_OK,
        Err(error) => {
            interpreter::report_top_level_error(&error);
            EXIT_SOFTWARE_ERROR
        }
    }
}
