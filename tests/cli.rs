//! Runs the `wave_collapse` binary against problem files on disk.

use std::process::{Command, Output};
use tempfile::NamedTempFile;
use wfc_core::{save_problem, Problem, PropagationTable, MAX_PATTERNS};

fn write_problem(problem: &Problem) -> NamedTempFile {
    let temp_file = NamedTempFile::with_suffix(".json").unwrap();
    save_problem(problem, temp_file.path()).unwrap();
    temp_file
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wave_collapse"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn free_problem(width: usize, height: usize, num_patterns: usize) -> Problem {
    Problem::with_table(
        width,
        height,
        num_patterns,
        &PropagationTable::free(num_patterns),
        vec![1.0; num_patterns],
    )
}

#[test]
fn test_text_output() {
    let file = write_problem(&free_problem(3, 2, 2));
    let output = run(&[file.path().to_str().unwrap(), "--seed", "4"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.len(), 3);
        assert!(row.chars().all(|c| c == '0' || c == '1'));
    }
}

#[test]
fn test_json_output_file() {
    let file = write_problem(&free_problem(4, 3, 3));
    let out = NamedTempFile::with_suffix(".json").unwrap();
    let output = run(&[
        file.path().to_str().unwrap(),
        "--seed",
        "10",
        "--format",
        "json",
        "--output",
        out.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let text = std::fs::read_to_string(out.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["grid"]["width"], 4);
    assert_eq!(json["grid"]["height"], 3);
    assert_eq!(json["grid"]["patterns"].as_array().unwrap().len(), 12);
    assert_eq!(json["seed"], 10);
    assert_eq!(json["attempts"], 1);
}

#[test]
fn test_seed_from_file_matches_flag() {
    let from_file = write_problem(&free_problem(6, 6, 4).seed(77));
    let without_seed = write_problem(&free_problem(6, 6, 4));

    let a = run(&[from_file.path().to_str().unwrap()]);
    let b = run(&[without_seed.path().to_str().unwrap(), "--seed", "77"]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn test_contradiction_exit_code() {
    let table = PropagationTable::from_pattern_rules(&[[0; MAX_PATTERNS]; 4]);
    let problem = Problem::with_table(2, 2, 2, &table, vec![1.0, 1.0]);
    let file = write_problem(&problem);

    let output = run(&[file.path().to_str().unwrap(), "--retries", "3"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_bad_input_exit_code() {
    let output = run(&["/nonexistent/problem.json"]);
    assert_eq!(output.status.code(), Some(1));

    let mut problem = free_problem(2, 2, 2);
    problem.weights.push(1.0);
    let file = write_problem(&problem);
    let output = run(&[file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}
