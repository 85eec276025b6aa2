//! Integration tests for the CLI interface
//!
//! Tests argument handling and the end-to-end file-to-file run.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SAMPLE_CONFIG: &str = r#"
version: 2.1
jobs:
  build:
    docker:
      - image: cimg/node:18.0
    steps:
      - checkout
      - run: npm install
      - run: npm run build
  test:
    docker:
      - image: cimg/node:18.0
    steps:
      - checkout
      - run: npm install
      - run: npm test
workflows:
  main:
    jobs:
      - build
      - test
"#;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("taskshift").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--input"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_missing_input_flag_fails() {
    let mut cmd = Command::cargo_bin("taskshift").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_nonexistent_input_file_fails() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("taskshift").unwrap();
    cmd.arg("--input")
        .arg(dir.path().join("missing.yml"))
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unparseable_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("config.yml");
    fs::write(&input, "version: 2.1\njobs: [not, a, mapping]\n").unwrap();

    let mut cmd = Command::cargo_bin("taskshift").unwrap();
    cmd.arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_full_run_writes_all_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("config.yml");
    fs::write(&input, SAMPLE_CONFIG).unwrap();
    let out_dir = dir.path().join("converted");

    let mut cmd = Command::cargo_bin("taskshift").unwrap();
    cmd.arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully converted"))
        .stdout(predicate::str::contains("Converted 2 jobs into tasks"));

    assert!(out_dir.join("config.yml").exists());
    assert!(out_dir.join("Taskfile.yml").exists());
    assert!(out_dir.join("TECHNOLOGY_ANALYSIS.md").exists());
}

#[test]
fn test_run_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("config.yml");
    fs::write(&input, SAMPLE_CONFIG).unwrap();

    let mut outputs = Vec::new();
    for out_name in ["first", "second"] {
        let out_dir = dir.path().join(out_name);
        let mut cmd = Command::cargo_bin("taskshift").unwrap();
        cmd.arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&out_dir)
            .assert()
            .success();
        outputs.push(fs::read_to_string(out_dir.join("Taskfile.yml")).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
}
