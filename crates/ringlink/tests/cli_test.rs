//! Integration tests for the `ringlink` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes, all
//! without a reachable hub.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `ringlink` binary with env isolation.
///
/// Clears `RINGLINK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn ringlink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ringlink");
    cmd.env("HOME", "/tmp/ringlink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ringlink-cli-test-nonexistent")
        .env_remove("RINGLINK_PROFILE")
        .env_remove("RINGLINK_LOCATION")
        .env_remove("RINGLINK_TOKEN")
        .env_remove("RINGLINK_ZID")
        .env_remove("RINGLINK_CONNECTIONS_URL")
        .env_remove("RINGLINK_OUTPUT")
        .env_remove("RINGLINK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Like [`ringlink_cmd`], but with a config file holding `contents`.
///
/// Returns the temp dir (keep it alive) and the config file path.
fn ringlink_cmd_with_config(
    contents: &str,
) -> (assert_cmd::Command, tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ringlink").join("config.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();

    let mut cmd = ringlink_cmd();
    cmd.env("HOME", dir.path()).env("XDG_CONFIG_HOME", dir.path());
    (cmd, dir, path)
}

const MALFORMED_CONFIG: &str = r#"default_profile = "cabin"

[profiles.home]
location_id = "loc-home"
timeout = "thirty"

[profiles.cabin]
location_id = "loc-cabin"
"#;

/// Concatenate stdout + stderr for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ringlink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    ringlink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Ring Alarm")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("panel"))
            .and(predicate::str::contains("mode")),
    );
}

#[test]
fn test_version_flag() {
    ringlink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ringlink"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    ringlink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    ringlink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_mode() {
    let output = ringlink_cmd().args(["mode", "armed"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("possible values") || text.contains("invalid value"),
        "Expected error listing valid modes:\n{text}"
    );
}

#[test]
fn test_mode_accepts_hub_spelling() {
    // Parsing succeeds; the failure is the missing location, not the mode.
    ringlink_cmd()
        .args(["mode", "some"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No location configured"));
}

#[test]
fn test_invalid_wait_policy() {
    let output = ringlink_cmd()
        .args(["--wait", "forever", "panel"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("first-match"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_devices_without_config() {
    ringlink_cmd()
        .arg("devices")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ringlink config init"));
}

#[test]
fn test_location_without_token() {
    ringlink_cmd()
        .args(["--location", "loc-1", "panel"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No access token"));
}

#[test]
fn test_unknown_profile() {
    ringlink_cmd()
        .args(["--profile", "cabin", "panel"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("cabin"));
}

#[test]
fn test_unreachable_endpoint() {
    ringlink_cmd()
        .args([
            "--location",
            "loc-1",
            "--token",
            "t",
            "--connections-url",
            "http://127.0.0.1:9/api/v1/rs/connections",
            "--timeout",
            "5",
            "snapshot",
        ])
        .assert()
        .code(7);
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    ringlink_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_path() {
    ringlink_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_subcommands_exist() {
    ringlink_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("profiles"))
                .and(predicate::str::contains("set-token")),
        );
}

#[test]
fn test_config_use_keeps_malformed_file() {
    let (mut cmd, _dir, path) = ringlink_cmd_with_config(MALFORMED_CONFIG);
    cmd.args(["config", "use", "home"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), MALFORMED_CONFIG);
}

#[test]
fn test_config_init_keeps_malformed_file() {
    let (mut cmd, _dir, path) = ringlink_cmd_with_config(MALFORMED_CONFIG);
    cmd.args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), MALFORMED_CONFIG);
}

#[test]
fn test_malformed_config_reported_by_hub_commands() {
    let (mut cmd, _dir, _path) = ringlink_cmd_with_config(MALFORMED_CONFIG);
    cmd.arg("panel").assert().code(1).stderr(
        predicate::str::contains("Configuration error")
            .and(predicate::str::contains("No location configured").not()),
    );
}

#[test]
fn test_config_use_does_not_save_env_token() {
    let (mut cmd, _dir, path) = ringlink_cmd_with_config(
        "[profiles.home]\nlocation_id = \"loc-home\"\n",
    );
    cmd.env("RINGLINK_PROFILES__HOME__ACCESS_TOKEN", "env-only-secret")
        .args(["config", "use", "home"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("default_profile = \"home\""));
    assert!(!text.contains("env-only-secret"));
}
