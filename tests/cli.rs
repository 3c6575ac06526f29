use std::process::Command;
use tempfile::tempdir;

fn rectrace() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rectrace"))
}

#[test]
fn prints_tree_and_result() {
    let output = rectrace().args(["fib", "3"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Recursive Tree: fib(3)"), "stdout: {}", stdout);
    assert!(stdout.contains("└── fib(1)=1"));
    assert!(stdout.trim_end().ends_with("fib(3) = 2"));
}

#[test]
fn no_animate_prints_only_the_result() {
    let output = rectrace()
        .args(["climb", "4", "--no-animate"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "climb(4) = 5");
}

#[test]
fn writes_dot_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binomial.dot");
    let output = rectrace()
        .args(["binomial", "4", "2", "--format", "dot", "--output"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("[label=\"take\"]"));
}

#[test]
fn config_file_and_flags_combine() {
    let dir = tempdir().unwrap();
    let anim = dir.path().join("anim.html");
    let config = dir.path().join("rectrace.toml");
    std::fs::write(&config, format!("save = true\npath = {:?}\n", anim.to_string_lossy())).unwrap();

    let output = rectrace()
        .args(["power-set", "2", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(std::fs::read_to_string(&anim).unwrap().contains("const FRAMES"));
}

#[test]
fn binomial_above_n_is_zero() {
    let output = rectrace()
        .args(["binomial", "2", "5", "--no-animate"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "binomial(2,5) = 0");
}

#[test]
fn function_error_exits_with_failure() {
    let output = rectrace().args(["factorial", "40"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("overflows u128"));
}

#[test]
fn unknown_function_is_rejected() {
    let output = rectrace().args(["ackermann", "2", "3"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown function"));
}
