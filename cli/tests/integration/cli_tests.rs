//! Argument parsing, help text and the version command.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::support::hoist;

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // arg_required_else_help prints help on stderr and exits 2
    hoist().assert().code(2).stderr(predicate::str::contains(
        "Push files, an environment file and a restart to one remote host over SSH",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    hoist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    hoist()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hoist"));
}

#[test]
fn test_version_command_shows_version() {
    hoist()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "hoist {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = hoist()
        .args(["version", "--json"])
        .output()
        .expect("run hoist");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_deploy_help_lists_plan_values() {
    hoist()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--plan"))
        .stdout(predicate::str::contains("transfer"))
        .stdout(predicate::str::contains("configure"));
}

// --- Global flags tests ---

#[test]
fn test_global_quiet_flag_silences_version() {
    hoist()
        .args(["--quiet", "version"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_global_no_color_flag_accepted() {
    hoist().args(["--no-color", "version"]).assert().success();
}

// --- Error handling tests ---

#[test]
fn test_unknown_command_exits_two() {
    hoist()
        .arg("nonexistent")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_unknown_plan_rejected_by_parser() {
    hoist()
        .args(["deploy", "--plan", "everything"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}
