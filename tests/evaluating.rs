mod util;

use util::{run_program, SOFTWARE_ERROR, SUCCESS};

#[test]
fn arithmetic_type_error_yields_runtime_error_with_line() {
    let source = "print \"the expression below is invalid\";\n49 + \"baz\";";
    let output = util::run("run", source);
    assert_eq!(output.stdout, "the expression below is invalid\n");
    assert_eq!(output.stderr, "Operands must be two numbers or two strings.\n[line 2]\n");
    assert_eq!(output.code, SOFTWARE_ERROR);
}

#[test]
fn only_nil_and_false_are_falsey() {
    let source = r#"
        if (nil) print "wrong"; else print "nil is falsey";
        if (false) print "wrong"; else print "false is falsey";
        if (0) print "zero is truthy"; else print "wrong";
        if ("") print "empty string is truthy"; else print "wrong";
    "#;
    run_program(source, "nil is falsey\nfalse is falsey\nzero is truthy\nempty string is truthy\n", SUCCESS);
}

#[test]
fn cross_type_equality_is_always_false() {
    let source = r#"
        print 1 == "1";
        print nil == false;
        print 1 == 1.0;
    "#;
    run_program(source, "false\nfalse\ntrue\n", SUCCESS);
}

#[test]
fn dividing_by_a_string_is_a_runtime_error() {
    let output = util::run("run", "print 1 / \"two\";");
    assert_eq!(output.code, SOFTWARE_ERROR);
    assert!(output.stderr.contains("Operands must be numbers."));
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let output = util::run("run", "print notDefined;");
    assert_eq!(output.code, SOFTWARE_ERROR);
    assert!(output.stderr.contains("Undefined variable 'notDefined'."));
}
