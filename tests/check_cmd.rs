use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn test_balanced_program_is_ok() {
    cargo_bin()
        .args(["check", "+[>[-]<-]"])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn test_check_does_not_run_the_program() {
    // Would move left of cell 0 if executed.
    cargo_bin()
        .args(["check", "<<.[]"])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn test_unclosed_open_bracket_is_reported() {
    // At runtime the cell is non-zero and this program would end normally.
    cargo_bin()
        .args(["check", "+[+"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no closing bracket for '[' at instruction 1"));
}

#[test]
fn test_stray_close_bracket_is_reported() {
    cargo_bin()
        .args(["check", "[]]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no opening bracket for ']' at instruction 2"));
}

#[test]
fn test_check_file() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "[\n-\n]").unwrap();
    cargo_bin()
        .arg("check").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn test_top_level_help() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("check"));
}
