use loxwalk::{
    lexer::tokenize,
    parse_expression, parse_program,
    parser::Parser,
    printer::{render_expr, render_program},
    DiagnosticKind, LoxError,
};
use pretty_assertions::assert_eq;

fn expr(source: &str) -> String {
    render_expr(&parse_expression(source).expect("expression should parse"))
}

fn program(source: &str) -> String {
    render_program(&parse_program(source).expect("program should parse"))
}

fn syntax_errors(source: &str) -> Vec<String> {
    match parse_program(source) {
        Ok(_) => panic!("expected syntax errors for {source:?}"),
        Err(LoxError::Compile(diagnostics)) => {
            diagnostics.iter().map(ToString::to_string).collect()
        }
        Err(other) => panic!("expected compile error, got {other}"),
    }
}

#[test]
fn renders_binary_expression() {
    assert_eq!(expr("1 + 1"), "(+ 1.0 1.0)");
}

#[test]
fn renders_unary_and_grouping() {
    assert_eq!(expr("-123 * (45.67)"), "(* (- 123.0) (group 45.67))");
    assert_eq!(expr("true"), "true");
    assert_eq!(expr("(nil)"), "(group nil)");
    assert_eq!(expr("!!false"), "(! (! false))");
    assert_eq!(expr("\"hello\""), "hello");
}

#[test]
fn respects_precedence_and_associativity() {
    assert_eq!(
        expr("1 + 2 * 3 - 4 / 5 == 6 > 7"),
        "(== (- (+ 1.0 (* 2.0 3.0)) (/ 4.0 5.0)) (> 6.0 7.0))"
    );
    assert_eq!(expr("1 - 2 - 3"), "(- (- 1.0 2.0) 3.0)");
    assert_eq!(expr("a or b and c"), "(or a (and b c))");
    assert_eq!(expr("a == b != c"), "(!= (== a b) c)");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(expr("a = b = c"), "(= a (= b c))");
}

#[test]
fn calls_chain_left_to_right() {
    assert_eq!(expr("f(1)(2, 3)"), "(call (call f 1.0) 2.0 3.0)");
    assert_eq!(expr("f()"), "(call f)");
}

#[test]
fn for_loop_desugars_into_while_inside_block() {
    assert_eq!(
        program("for (var i = 0; i < 3; i = i + 1) print i;"),
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
    );
}

#[test]
fn for_loop_without_clauses_loops_on_true() {
    assert_eq!(program("for (;;) print 1;"), "(while true (print 1.0))");
}

#[test]
fn renders_statements() {
    let source = "\
var a;
var b = 2;
if (a) print a; else { print b; }
while (b > 0) b = b - 1;
fun add(x, y) { return x + y; }
fun noop() { return; }";
    assert_eq!(
        program(source),
        "\
(var a)
(var b 2.0)
(if a (print a) (block (print b)))
(while (> b 0.0) (; (= b (- b 1.0))))
(fun add (x y) (return (+ x y)))
(fun noop () (return))"
    );
}

#[test]
fn missing_expression_is_reported_at_the_offending_token() {
    assert_eq!(
        syntax_errors("print ;"),
        vec!["[line 1] Error at ';': Expect expression."]
    );
}

#[test]
fn errors_at_eof_are_reported_at_end() {
    let err = parse_expression("(1 + 2").expect_err("unclosed group");
    assert_eq!(
        err.to_string(),
        "[line 1] Error at end: Expect ')' after expression."
    );
    assert_eq!(err.exit_code(), 65);
}

#[test]
fn invalid_assignment_target_keeps_parsing() {
    assert_eq!(
        syntax_errors("1 = 2;\nvar a + 1;"),
        vec![
            "[line 1] Error at '=': Invalid assignment target.",
            "[line 2] Error at '+': Expect ';' after variable declaration.",
        ]
    );
}

#[test]
fn recovers_and_reports_several_errors() {
    let (tokens, lexical) = tokenize("var = 1;\nprint ;\nvar ok = 2;\n{ print 1 }");
    assert!(lexical.is_empty());
    let (statements, errors) = Parser::new(tokens).program();
    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "[line 1] Error at '=': Expect variable name.",
            "[line 2] Error at ';': Expect expression.",
            "[line 4] Error at '}': Expect ';' after value.",
            "[line 4] Error at end: Expect '}' after block.",
        ]
    );
    assert!(errors
        .iter()
        .all(|diagnostic| diagnostic.kind == DiagnosticKind::Parser));
    assert_eq!(render_program(&statements[..1]), "(var ok 2.0)");
}

#[test]
fn lexical_and_syntax_errors_are_reported_together() {
    assert_eq!(
        syntax_errors("var x = @;"),
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn too_many_arguments_is_reported_without_aborting() {
    let args = vec!["0"; 256].join(", ");
    let source = format!("f({args});\nprint 1;");
    let (tokens, _) = tokenize(&source);
    let (statements, errors) = Parser::new(tokens).program();
    assert_eq!(statements.len(), 2);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at '0': Can't have more than 255 arguments."
    );
}

#[test]
fn too_many_parameters_is_reported_without_aborting() {
    let params: Vec<String> = (0..256).map(|n| format!("p{n}")).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));
    let (tokens, _) = tokenize(&source);
    let (statements, errors) = Parser::new(tokens).program();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
    );
}

#[test]
fn unterminated_block_reports_missing_brace() {
    assert_eq!(
        syntax_errors("{ var a = 1;"),
        vec!["[line 1] Error at end: Expect '}' after block."]
    );
}
