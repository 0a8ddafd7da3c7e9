mod util;

use indoc::indoc;
use util::{run_tokenize, DATA_ERROR, SUCCESS};

#[test]
fn empty_file() {
    run_tokenize("", "Eof  null\n", SUCCESS);
}

#[test]
fn parentheses_and_braces() {
    let input = "(){}";
    let expected = indoc! {"
        LeftParen ( null
        RightParen ) null
        LeftBrace { null
        RightBrace } null
        Eof  null
    "};
    run_tokenize(input, expected, SUCCESS);
}

#[test]
fn numbers_keep_a_trailing_dot_separate() {
    let input = "123.";
    let expected = indoc! {"
        Number 123 123.0
        Dot . null
        Eof  null
    "};
    run_tokenize(input, expected, SUCCESS);
}

#[test]
fn unterminated_string_is_a_data_error() {
    let output = util::run("tokenize", "\"oops");
    assert_eq!(output.code, DATA_ERROR);
    assert!(output.stderr.contains("Unterminated string."));
}

#[test]
fn unexpected_character_is_a_data_error_but_scanning_continues() {
    let input = "@ (";
    let expected = indoc! {"
        LeftParen ( null
        Eof  null
    "};
    let output = util::run("tokenize", input);
    assert_eq!(output.stdout, expected);
    assert_eq!(output.code, DATA_ERROR);
}
