mod util;

use util::{run_program, SUCCESS};

#[test]
fn initializer_always_yields_instance() {
    let source = r#"
        class K { init(x){ this.x=x; if (x==0) return; } }
        var k=K(7); print k.x; print K(0).x;
    "#;
    run_program(source, "7\nnil\n", SUCCESS);
}

#[test]
fn super_dispatch_with_three_level_chain() {
    let source = r#"
        class A { m(){ print "A"; } }
        class B<A { m(){ super.m(); print "B"; } }
        class C<B {}
        C().m();
    "#;
    run_program(source, "A\nB\n", SUCCESS);
}

#[test]
fn method_bound_to_original_instance_survives_reassignment() {
    let source = r#"
        class Person { sayName(){ print this.name; } }
        var a = Person(); a.name = "a";
        var b = Person(); b.name = "b";
        b.sayName = a.sayName;
        b.sayName();
    "#;
    run_program(source, "a\n", SUCCESS);
}

#[test]
fn class_can_not_inherit_from_itself() {
    let output = util::run("run", "class Oops < Oops {}");
    assert_eq!(output.code, util::DATA_ERROR);
    assert!(output.stderr.contains("A class can't inherit from itself."));
}
