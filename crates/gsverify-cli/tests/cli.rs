#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ANSWER_42: &str = r#"{"input":"","output":"42\n"}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("tmp dir");
        let config = "\
interpreter:
  program: /bin/sh
  args: []
timeout_ms: 2000
metadata_url: \"http://127.0.0.1:9/jsonp.rb?\"
";
        fs::write(dir.path().join("gsverify.yaml"), config).expect("write config");
        fs::create_dir_all(dir.path().join("problems")).expect("create corpus");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn problem(&self, name: &str, metadata: &str) -> PathBuf {
        let dir = self.path().join("problems").join(name);
        fs::create_dir_all(dir.join("gs")).expect("create problem");
        fs::write(dir.join("problem.json"), metadata).expect("write metadata");
        dir
    }

    fn solution(&self, problem: &str, file_name: &str, body: &str) {
        let path = self
            .path()
            .join("problems")
            .join(problem)
            .join("gs")
            .join(file_name);
        fs::write(path, body).expect("write solution");
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("gsverify");
        cmd.current_dir(self.path())
            .args(["--config", "gsverify.yaml"])
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn missing_corpus_exits_with_instructions() {
    let temp = TempDir::new().expect("tmp dir");
    cargo_bin_cmd!("gsverify")
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Download"))
        .stdout(predicate::str::contains("'problems'"));
}

#[test]
fn passing_solution_is_reported() {
    let ws = Workspace::new();
    ws.problem("Answer", ANSWER_42);
    ws.solution("Answer", "solver.1230000000.gs", "printf 42");

    ws.cmd()
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("solver.1230000000.gs"))
        .stdout(predicate::str::contains("1 passes, 0 fails"));
}

#[test]
fn failing_solution_does_not_change_exit_code() {
    let ws = Workspace::new();
    ws.problem("Answer", ANSWER_42);
    ws.solution("Answer", "solver.1230000000.gs", "printf 41");

    ws.cmd()
        .assert()
        .code(0)
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("actual=\"41\" expected=\"42\\n\""))
        .stdout(predicate::str::contains("0 passes, 1 fails"));
}

#[test]
fn slow_solution_counts_as_failure() {
    let ws = Workspace::new();
    ws.problem("Answer", ANSWER_42);
    ws.solution("Answer", "solver.1230000000.gs", "exec sleep 30");

    ws.cmd()
        .args(["--timeout-ms", "200"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("SLOW"))
        .stdout(predicate::str::contains("0 passes, 1 fails"));
}

#[test]
fn resume_cursor_is_positional() {
    let ws = Workspace::new();
    for name in ["apple", "mango"] {
        ws.problem(name, ANSWER_42);
        ws.solution(name, "solver.1230000000.gs", "printf 42");
    }

    ws.cmd()
        .arg("m")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("mango"))
        .stdout(predicate::str::contains("apple").not())
        .stdout(predicate::str::contains("1 passes, 0 fails"));
}

#[test]
fn list_prints_selected_problems_only() {
    let ws = Workspace::new();
    for name in ["Quine", "apple", "mango"] {
        ws.problem(name, ANSWER_42);
        ws.solution(name, "solver.1230000000.gs", "printf 42");
    }

    ws.cmd()
        .arg("--list")
        .assert()
        .code(0)
        .stdout("apple\nmango\n");
}

#[test]
fn parallel_jobs_keep_problem_order() {
    let ws = Workspace::new();
    for (name, delay) in [("a", "0.4"), ("b", "0.2"), ("c", "0")] {
        ws.problem(name, ANSWER_42);
        ws.solution(name, "solver.1230000000.gs", &format!("sleep {delay}; printf 42"));
    }

    let output = ws
        .cmd()
        .args(["--jobs", "3"])
        .output()
        .expect("run gsverify");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let a = stdout.find("/a/gs/").expect("a reported");
    let b = stdout.find("/b/gs/").expect("b reported");
    let c = stdout.find("/c/gs/").expect("c reported");
    assert!(a < b && b < c, "out of order:\n{stdout}");
    assert!(stdout.contains("3 passes, 0 fails"));
}

#[test]
fn unreachable_metadata_service_skips_the_problem() {
    let ws = Workspace::new();
    let dir = ws.problem("Remote", ANSWER_42);
    fs::remove_file(dir.join("problem.json")).expect("remove cache");
    ws.solution("Remote", "solver.1230000000.gs", "printf 42");

    ws.cmd()
        .assert()
        .code(0)
        .stdout(predicate::str::contains("0 passes, 0 fails"));
    assert!(!dir.join("problem.json").exists());
}

#[test]
fn zero_jobs_is_a_tool_error() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--jobs", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--jobs must be >= 1"));
}

#[test]
fn invalid_config_is_a_tool_error() {
    let ws = Workspace::new();
    fs::write(ws.path().join("bad.yaml"), "timeout_ms: [1]\n").expect("write config");
    cargo_bin_cmd!("gsverify")
        .current_dir(ws.path())
        .args(["--config", "bad.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tool error"));
}
