use std::io::{self, Write};

use crate::error::ErrorReporter;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Interactive prompt (`spec.md` §7 REPL semantics, Open Question resolved
/// in favor of the book's behavior: an environment survives across lines,
/// but an error on one line never poisons the next). Grounded on the
/// `run_prompt` loop in `yokurang-crafting-interpreters-rs/src/runner/runner.rs`,
/// generalized to a persistent `Interpreter` and the bare-expression
/// convenience.
pub fn run() {
    let mut interpreter = Interpreter::new(Default::default());
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().expect("stdout is writable");

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line).expect("stdin is readable");
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim_end_matches('\n');
        if trimmed.trim().is_empty() {
            continue;
        }

        run_line(&mut interpreter, trimmed);
    }
}

/// Trials the line as a single bare expression first, silently; if that
/// grammar accepts the whole line, echoes the value as if `print` had been
/// typed (`spec.md` §7, `SPEC_FULL.md` §12's bare-expression convenience).
/// Otherwise reparses as a full statement list and reports any errors for
/// real — this order keeps the trial parse's diagnostics from leaking into
/// the terminal for the common case of typing an expression with no `;`.
fn run_line(interpreter: &mut Interpreter, source: &str) {
    let trial = ErrorReporter::silent();
    let trial_tokens = Scanner::new(source, &trial).scan_tokens();
    let mut trial_parser = Parser::new(trial_tokens, &trial);

    if let Ok(expr) = trial_parser.parse_expression() {
        if !trial.had_error() {
            let resolver_reporter = ErrorReporter::new();
            let print_stmt = crate::stmt::Stmt::Print(expr.clone());
            let locals = Resolver::new(&resolver_reporter).resolve(std::slice::from_ref(&print_stmt));
            if resolver_reporter.had_error() {
                return;
            }
            interpreter.add_locals(locals);
            match interpreter.evaluate_standalone(&expr) {
                Ok(value) => println!("{value}"),
                Err(error) => crate::interpreter::report_top_level_error(&error),
            }
            return;
        }
    }

    let reporter = ErrorReporter::new();
    let tokens = Scanner::new(source, &reporter).scan_tokens();
    let statements = Parser::new(tokens, &reporter).parse();
    if reporter.had_error() {
        return;
    }

    let locals = Resolver::new(&reporter).resolve(&statements);
    if reporter.had_error() {
        return;
    }

    interpreter.add_locals(locals);
    if let Err(error) = interpreter.interpret(&statements) {
        crate::interpreter::report_top_level_error(&error);
    }
}
