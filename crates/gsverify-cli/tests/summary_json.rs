#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn load_summary_schema() -> JSONSchema {
    let schema_path = repo_root().join("schemas").join("run-summary.schema.json");
    let schema_text = fs::read_to_string(schema_path).expect("read summary schema");
    let schema_json: Value = serde_json::from_str(&schema_text).expect("parse summary schema");
    JSONSchema::compile(&schema_json).expect("compile summary schema")
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("read json");
    serde_json::from_str(&text).expect("parse json")
}

fn write_corpus(root: &Path) {
    let config = "interpreter:\n  program: /bin/sh\n  args: []\ntimeout_ms: 300\n";
    fs::write(root.join("gsverify.yaml"), config).expect("write config");
    let problem = root.join("problems").join("Answer");
    fs::create_dir_all(problem.join("gs")).expect("create problem");
    fs::write(
        problem.join("problem.json"),
        r#"{"input":"","output":"42\n"}"#,
    )
    .expect("write metadata");
    let solutions = [
        ("good.1230000000.gs", "printf 42"),
        ("wrong.1230000000.gs", "printf 41"),
        ("slow.1230000000.gs", "exec sleep 30"),
        ("dice.1230000000.gs", "printf 42 # rand"),
    ];
    for (name, body) in solutions {
        fs::write(problem.join("gs").join(name), body).expect("write solution");
    }
}

fn run_with_summary(args: &[&str]) -> Value {
    let temp = TempDir::new().expect("tmp dir");
    write_corpus(temp.path());
    let summary_path = temp.path().join("summary.json");

    let output = cargo_bin_cmd!("gsverify")
        .current_dir(temp.path())
        .args(["--config", "gsverify.yaml", "--summary-json"])
        .arg(&summary_path)
        .args(args)
        .output()
        .expect("run gsverify");
    assert_eq!(output.status.code(), Some(0));
    assert!(!temp.path().join("summary.tmp").exists());

    read_json(&summary_path)
}

#[test]
fn summary_json_passes_schema_and_counts_verdicts() {
    let schema = load_summary_schema();
    let summary = run_with_summary(&[]);

    assert!(schema.validate(&summary).is_ok());
    assert_eq!(summary["tool"]["name"], "gsverify");
    assert_eq!(summary["problems"], 1);
    assert_eq!(summary["passes"], 1);
    assert_eq!(summary["fails"], 2);
    assert_eq!(summary["slow"], 1);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["invocation"]["resume_from"], Value::Null);
    assert_eq!(summary["invocation"]["timeout_ms"], 300);
}

#[test]
fn summary_json_lists_failures_with_content_hash() {
    let summary = run_with_summary(&["--compact"]);
    let failures = summary["failures"].as_array().expect("failures array");
    let verdicts: Vec<(&str, &str)> = failures
        .iter()
        .map(|failure| {
            let solution = failure["solution"].as_str().expect("solution");
            let name = solution.rsplit('/').next().expect("file name");
            (name, failure["verdict"].as_str().expect("verdict"))
        })
        .collect();
    assert_eq!(
        verdicts,
        vec![("slow.1230000000.gs", "SLOW"), ("wrong.1230000000.gs", "FAIL")]
    );
    let wrong = &failures[1]["sha256"];
    assert_eq!(wrong.as_str().map(str::len), Some(64));
    assert_eq!(summary["invocation"]["compact"], true);
}

#[test]
fn summary_json_records_resume_cursor() {
    let schema = load_summary_schema();
    let summary = run_with_summary(&["B"]);
    assert!(schema.validate(&summary).is_ok());
    assert_eq!(summary["invocation"]["resume_from"], "B");
    assert_eq!(summary["problems"], 0);
    assert_eq!(summary["passes"], 0);
}
