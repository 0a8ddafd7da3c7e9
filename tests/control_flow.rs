mod util;

use util::{run_program, SUCCESS};

#[test]
fn for_loop_with_continue_still_runs_the_increment() {
    let source = "for (var i=0;i<5;i=i+1){ if (i==2 or i==3) continue; print i; }";
    run_program(source, "0\n1\n4\n", SUCCESS);
}

#[test]
fn break_exits_the_nearest_enclosing_loop_only() {
    let source = r#"
        for (var i=0;i<3;i=i+1){
            for (var j=0;j<3;j=j+1){
                if (j==1) break;
                print j;
            }
            print i;
        }
    "#;
    run_program(source, "0\n0\n0\n1\n0\n2\n", SUCCESS);
}

#[test]
fn break_outside_a_loop_is_a_data_error() {
    let output = util::run("run", "break;");
    assert_eq!(output.code, util::DATA_ERROR);
    assert!(output.stderr.contains("Can't use 'break' outside of loop."));
}

#[test]
fn while_loop_with_break() {
    let source = "var i=0; while (true) { if (i==3) break; print i; i=i+1; }";
    run_program(source, "0\n1\n2\n", SUCCESS);
}
