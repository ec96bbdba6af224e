use assert_cmd::Command;
use predicates::prelude::*;
use std::{fs, path::PathBuf};
use tempfile::{tempdir, TempDir};

fn script(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("script.lox");
    fs::write(&path, contents).expect("write script");
    (dir, path)
}

fn loxwalk() -> Command {
    Command::cargo_bin("loxwalk").expect("binary exists")
}

#[test]
fn tokenize_prints_listing() {
    let (_dir, path) = script("var x = 1;");
    loxwalk()
        .arg("tokenize")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            "VAR var null\n\
             IDENTIFIER x null\n\
             EQUAL = null\n\
             NUMBER 1 1.0\n\
             SEMICOLON ; null\n\
             EOF  null\n",
        );
}

#[test]
fn tokenize_reports_lexical_errors_with_exit_65() {
    let (_dir, path) = script("(@)");
    loxwalk()
        .arg("tokenize")
        .arg(&path)
        .assert()
        .code(65)
        .stdout("LEFT_PAREN ( null\nRIGHT_PAREN ) null\nEOF  null\n")
        .stderr(predicate::str::contains(
            "[line 1] Error: Unexpected character: @",
        ));
}

#[test]
fn parse_prints_syntax_tree() {
    let (_dir, path) = script("-123 * (45.67)");
    loxwalk()
        .arg("parse")
        .arg(&path)
        .assert()
        .success()
        .stdout("(* (- 123.0) (group 45.67))\n");
}

#[test]
fn parse_errors_exit_65() {
    let (_dir, path) = script("(72 +)");
    loxwalk()
        .arg("parse")
        .arg(&path)
        .assert()
        .code(65)
        .stderr(predicate::str::contains(
            "[line 1] Error at ')': Expect expression.",
        ));
}

#[test]
fn evaluate_prints_value() {
    let (_dir, path) = script("(1 + 1) - 3");
    loxwalk()
        .arg("evaluate")
        .arg(&path)
        .assert()
        .success()
        .stdout("-1\n");
}

#[test]
fn evaluate_runtime_error_exits_70() {
    let (_dir, path) = script("-\"world\"");
    loxwalk()
        .arg("evaluate")
        .arg(&path)
        .assert()
        .code(70)
        .stderr(predicate::str::contains(
            "Operand must be a number.\n[line 1]",
        ));
}

#[test]
fn run_demo_counter() {
    loxwalk()
        .arg("run")
        .arg("demos/counter.lox")
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn run_keeps_output_printed_before_runtime_error() {
    let (_dir, path) = script("print \"before\";\nprint undefined;\nprint \"after\";");
    loxwalk()
        .arg("run")
        .arg(&path)
        .assert()
        .code(70)
        .stdout("before\n")
        .stderr(predicate::str::contains(
            "Undefined variable 'undefined'.\n[line 2]",
        ));
}

#[test]
fn run_syntax_error_prints_nothing() {
    let (_dir, path) = script("print \"never\";\nvar = 1;");
    loxwalk()
        .arg("run")
        .arg(&path)
        .assert()
        .code(65)
        .stdout("")
        .stderr(predicate::str::contains(
            "[line 2] Error at '=': Expect variable name.",
        ));
}

#[test]
fn missing_file_fails() {
    let dir = tempdir().expect("create temp dir");
    loxwalk()
        .arg("run")
        .arg(dir.path().join("absent.lox"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error reading file"));
}

#[test]
fn unknown_command_is_rejected() {
    loxwalk().arg("compile").assert().failure();
}
