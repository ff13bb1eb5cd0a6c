use plox::ast::Value;
use plox::{RunError, Session};
use pretty_assertions::assert_eq;

struct Outcome {
    printed: String,
    diagnostics: String,
    result: Result<Vec<Value>, RunError>,
}

fn run(source: &str) -> Outcome {
    let mut session = Session::new(Vec::new());
    let mut errors = Vec::new();
    let result = session.run(source, &mut errors);
    Outcome {
        printed: String::from_utf8(session.into_output()).unwrap(),
        diagnostics: String::from_utf8(errors).unwrap(),
        result,
    }
}

#[test]
fn fizzbuzz_style_program() {
    let outcome = run(r#"
        // counts down with a nested block comment /* like /* this */ */
        var n = 5;
        var label = "";
        while (n > 0) {
            if (n == 3 or n == 5) label = label + "x";
            else label = label + "o";
            n = n - 1;
        }
        print label;
        print n;
    "#);
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.printed, "xoxoo\n0\n");
    assert_eq!(outcome.diagnostics, "");
}

#[test]
fn shadowing_in_nested_scopes() {
    let outcome = run(r#"
        var a = "global a";
        var b = "global b";
        {
            var a = "outer a";
            {
                var a = "inner a";
                print a;
                print b;
            }
            print a;
        }
        print a;
    "#);
    assert_eq!(
        outcome.printed,
        "inner a\nglobal b\nouter a\nglobal a\n"
    );
}

#[test]
fn for_loop_with_break() {
    let outcome = run("for (var i = 0; i < 3; i = i + 1) { if (i == 1) break; print i; }");
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.printed, "0\n");
}

#[test]
fn fibonacci() {
    let outcome = run(r#"
        var a = 0;
        var temp;
        for (var b = 1; a < 100; b = temp + b) {
            print a;
            temp = a;
            a = b;
        }
    "#);
    assert_eq!(
        outcome.printed,
        "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n55\n89\n"
    );
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let outcome = run("print \"before\";\nvar x = \"a\" + 1;\nprint \"after\";");
    assert_eq!(outcome.printed, "before\n");
    assert_eq!(
        outcome.diagnostics,
        "Runtime error at evaluation of PLUS (2: 13): PLUS was expecting (<number>, <number>) or (<string>, <string>) instead received (<string>, <number>)\n"
    );
    assert!(matches!(outcome.result, Err(RunError::Runtime(_))));
}

#[test]
fn undefined_assignment_halts_before_print() {
    let outcome = run("x = 5; print x;");
    assert_eq!(outcome.printed, "");
    assert_eq!(
        outcome.diagnostics,
        "Runtime error at evaluation of IDENTIFIER (1: 1): Undefined variable 'x'\n"
    );
}

#[test]
fn syntax_errors_are_all_reported() {
    let outcome = run("print (1;\nvar 2 = 3;\nprint \"ok\";");
    assert_eq!(
        outcome.diagnostics,
        "[line 1, column 9] at ';': Expected ')' but found ';'\n\
         [line 2, column 5] at '2': Expected 'IDENTIFIER' but found '2'\n"
    );
    assert_eq!(outcome.printed, "");
    assert!(matches!(outcome.result, Err(RunError::Parse(2))));
}

#[test]
fn scan_errors_are_reported_with_positions() {
    let outcome = run("var s = \"open;\nprint s;");
    assert_eq!(
        outcome.diagnostics,
        "[line 1, column 9] at '\"open;\nprint s;': Unterminated string.\n"
    );
    assert!(matches!(outcome.result, Err(RunError::Scan(1))));
}

#[test]
fn expression_results_are_returned() {
    let outcome = run("\"a\" + \"b\"; 1 + 2 * 3; var unused;");
    assert_eq!(
        outcome.result.unwrap(),
        vec![Value::String("ab".to_string()), Value::Number(7.0)]
    );
}

#[test]
fn printing_values() {
    let outcome = run("print nil; print true; print 10 / 4; print 3.0; print \"tab\\there\";");
    assert_eq!(outcome.printed, "nil\ntrue\n2.5\n3\ntab\there\n");
}

#[test]
fn break_outside_loop_is_an_error() {
    let outcome = run("print 1; if (true) break;");
    assert_eq!(outcome.printed, "1\n");
    assert_eq!(
        outcome.diagnostics,
        "Runtime error at evaluation of BREAK (1: 20): break statement seen outside of a loop\n"
    );
}
