mod util;

use util::{run_program, SUCCESS};

#[test]
fn closures_capture_bindings_not_values() {
    let source = r#"
        fun makeCounter(){ var i=0; fun c(){ i=i+1; return i; } return c; }
        var c=makeCounter(); print c(); print c();
    "#;
    run_program(source, "1\n2\n", SUCCESS);
}

#[test]
fn static_scope_beats_dynamic_shadowing() {
    let source = r#"
        var a="global"; { fun showA(){ print a; } showA(); var a="block"; showA(); }
    "#;
    run_program(source, "global\nglobal\n", SUCCESS);
}
