use std::fs;
use std::process::ExitCode;

use anyhow::Context;

use rlox::interpreter::Interpreter;
use rlox::{EXIT_DATA_ERROR, EXIT_OK, EXIT_SOFTWARE_ERROR};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <tokenize|parse|ast|evaluate|run|repl> [file]", args[0]);
        return ExitCode::from(EXIT_DATA_ERROR as u8);
    }

    let command = args[1].as_str();

    if command == "repl" {
        rlox::repl::run();
        return ExitCode::from(EXIT_OK as u8);
    }

    let Some(filename) = args.get(2) else {
        eprintln!("Usage: {} {} <file>", args[0], command);
        return ExitCode::from(EXIT_DATA_ERROR as u8);
    };

    let code = match read_source(filename) {
        Ok(source) => dispatch(command, &source),
        Err(error) => {
            eprintln!("{error:#}");
            EXIT_DATA_ERROR
        }
    };

    ExitCode::from(code as u8)
}

fn read_source(filename: &str) -> anyhow::Result<String> {
    fs::read_to_string(filename).with_context(|| format!("failed to read file {filename}"))
}

fn dispatch(command: &str, source: &str) -> i32 {
    match command {
        "tokenize" => tokenize(source),
        "parse" => parse(source),
        "ast" => ast(source),
        "evaluate" => evaluate(source),
        "run" => rlox::run_source(source),
        other => {
            eprintln!("Unknown command: {other}");
            EXIT_DATA_ERROR
        }
    }
}

fn tokenize(source: &str) -> i32 {
    let (tokens, had_error) = rlox::tokenize_source(source);
    for token in &tokens {
        println!("{token}");
    }
    if had_error { EXIT_DATA_ERROR } else { EXIT_OK }
}

/// Parses a single expression (not a full program) and prints its debug
/// form; diagnostic only.
fn parse(source: &str) -> i32 {
    match rlox::parse_expression_source(source) {
        Some(expr) => {
            println!("{expr:?}");
            EXIT_OK
        }
        None => EXIT_DATA_ERROR,
    }
}

fn ast(source: &str) -> i32 {
    let (statements, had_error) = rlox::parse_source(source);
    if had_error {
        return EXIT_DATA_ERROR;
    }
    println!("{statements:#?}");
    EXIT_OK
}

/// Evaluates a single expression without running the resolver, matching
/// the teacher's `evaluate`, which has no enclosing program to resolve.
fn evaluate(source: &str) -> i32 {
    let expr = match rlox::parse_expression_source(source) {
        Some(expr) => expr,
        None => return EXIT_DATA_ERROR,
    };
    let mut interpreter = Interpreter::new(Default::default());
    match interpreter.evaluate_standalone(&expr) {
        Ok(value) => {
            println!("{value}");
            EXIT_OK
        }
        Err(error) => {
            rlox::interpreter::report_top_level_error(&error);
            EXIT_SOFTWARE_ERROR
        }
    }
}
