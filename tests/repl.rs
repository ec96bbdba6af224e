use loxwalk::repl::is_statement;

#[test]
fn lines_ending_in_semicolon_or_brace_are_statements() {
    assert!(is_statement("var a = 1;"));
    assert!(is_statement("print a;"));
    assert!(is_statement("fun f() { return 1; }"));
    assert!(is_statement("{ var b = 2; }"));
}

#[test]
fn other_lines_are_expressions() {
    assert!(!is_statement("1 + 2"));
    assert!(!is_statement("f()"));
    assert!(!is_statement("\"a;\" + \"b\""));
    assert!(!is_statement(""));
}
