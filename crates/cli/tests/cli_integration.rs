//! CLI integration tests for `scrumpilot generate` and the top-level flags.
//!
//! Every command runs in a fresh temp directory with LLM credentials
//! removed, so no `.env` or `scrumpilot.toml` from the checkout leaks in.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scrumpilot(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("scrumpilot");
    cmd.current_dir(dir.path());
    for var in [
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
        "SCRUMPILOT_LLM__API_KEY",
        "SCRUMPILOT_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_input(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    scrumpilot(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    scrumpilot(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scrumpilot"));
}

#[test]
fn generate_ticket_prints_json() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "ticket.json",
        r#"{"description": "Fix the mobile login error for customers", "labels": ["auth"]}"#,
    );
    let output = scrumpilot(&dir)
        .args(["generate", "ticket", "--seed", "3", "--input"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let ticket = stdout_json(&output);
    let labels = ticket["labels"].as_array().unwrap();
    for expected in ["auth", "bug-fix", "mobile"] {
        assert!(labels.contains(&expected.into()), "missing {}", expected);
    }
    assert_eq!(ticket["business_value"], 7);
}

#[test]
fn seeded_blockers_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "blockers.json", "{}");
    let run = || {
        let output = scrumpilot(&dir)
            .args(["generate", "blockers", "--seed", "11", "--input"])
            .arg(&input)
            .output()
            .unwrap();
        assert!(output.status.success());
        stdout_json(&output)
    };
    let (first, second) = (run(), run());
    assert_eq!(first["alerts"], second["alerts"]);
    assert_eq!(first["trend_analysis"], second["trend_analysis"]);
    assert_ne!(first["id"], second["id"]);
}

#[test]
fn invalid_sprint_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "sprint.json",
        r#"{"name": "S1", "objectives": "x", "team_capacity": 0, "start_date": "2026-03-01", "end_date": "2026-03-14"}"#,
    );
    scrumpilot(&dir)
        .args(["generate", "sprint", "--input"])
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("team_capacity"));
}

#[test]
fn malformed_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "retro.json", "{ nope");
    scrumpilot(&dir)
        .args(["generate", "retrospective", "--input"])
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed input"));
}

#[test]
fn standup_without_key_exits_1() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "standup.json",
        r#"{"team_member_id": "u-1", "yesterday": "a", "today": "b"}"#,
    );
    scrumpilot(&dir)
        .args(["generate", "standup", "--input"])
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn standup_with_unreachable_model_uses_fallback() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "standup.json",
        r#"{"team_member_id": "u-1", "team_member_name": "Bo", "yesterday": "a", "today": "b"}"#,
    );
    fs::write(
        dir.path().join("scrumpilot.toml"),
        "[llm]\napi_key = \"test-key\"\nbase_url = \"http://127.0.0.1:9\"\ntimeout_secs = 5\n",
    )
    .unwrap();
    let output = scrumpilot(&dir)
        .args(["generate", "standup", "--input"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let standup = stdout_json(&output);
    assert_eq!(standup["summary"], "Daily standup completed by Bo");
    assert_eq!(standup["sentiment_analysis"]["confidence"], 0.5);
}
