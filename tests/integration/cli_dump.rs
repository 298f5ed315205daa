//! CLI tests for the `dump` and `replay` subcommands

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use super::common::traces;

fn wumpus_replay(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wumpus-replay").expect("binary not built");
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn write_trace(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("kb.txt");
    std::fs::write(&path, contents).expect("Failed to write trace");
    path
}

#[test]
fn test_dump_prints_rounds_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, traces::WINNING_GAME);

    let output = wumpus_replay(dir.path())
        .arg("dump")
        .arg(&trace)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("stdout is not JSON");
    let rounds = json["rounds"].as_array().expect("rounds array");
    assert_eq!(rounds.len(), 3);
    assert_eq!(rounds[0]["index"], 0);
    assert_eq!(rounds[2]["end_status"], "won");
    assert_eq!(rounds[1]["wumpus_status"], "dead");

    assert!(dir.path().join("config.toml").exists());
    assert!(dir.path().join("logs").join("wumpus-replay.log").exists());
}

#[test]
fn test_dump_reports_dropped_rounds_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, traces::FIRST_BLOCK_INCOMPLETE);

    wumpus_replay(dir.path())
        .arg("dump")
        .arg(&trace)
        .assert()
        .success()
        .stderr(predicate::str::contains("Incomplete data for block 1"))
        .stdout(predicate::str::contains("\"index\": 0"));
}

#[test]
fn test_dump_fails_without_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, "no delimiters here\n");

    wumpus_replay(dir.path())
        .arg("dump")
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("New Round:"));
}

#[test]
fn test_dump_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    wumpus_replay(dir.path())
        .arg("dump")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read trace"));
}

#[test]
fn test_replay_steps_through_piped_commands() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, traces::SINGLE_ROUND);

    wumpus_replay(dir.path())
        .arg("replay")
        .arg(&trace)
        .write_stdin("s\nn\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 0: Agent at [1,1]"))
        .stdout(predicate::str::contains("End of simulation data reached."));

    assert!(dir.path().join("logs").join("wumpus-replay.log").exists());
}
