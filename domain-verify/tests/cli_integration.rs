// domain-verify/tests/cli_integration.rs

//! CLI tests that never touch the network: argument handling, input files,
//! configuration and dry runs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{NamedTempFile, TempDir};

/// Helper to create a candidates file
fn create_candidates_file(lines: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    fs::write(file.path(), lines.join("\n")).expect("Failed to write to temp file");
    file
}

/// Command isolated from the user's config files and `DV_*` environment.
fn isolated_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("domain-verify").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    for key in ["DV_LIMIT", "DV_TIMEOUT", "DV_WHOIS", "DV_MX_IPS", "DV_JSON", "DV_CONFIG"] {
        cmd.env_remove(key);
    }
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("domain-verify").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--limit"))
        .stdout(predicate::str::contains("--no-whois"))
        .stdout(predicate::str::contains("--no-mx-ips"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("domain-verify").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_input_is_an_error() {
    let home = TempDir::new().unwrap();
    isolated_cmd(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("You must specify candidate domains"));
}

#[test]
fn test_zero_limit_rejected() {
    let home = TempDir::new().unwrap();
    isolated_cmd(&home)
        .args(["example.com", "--limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Limit must be at least 1"));
}

#[test]
fn test_bad_timeout_rejected() {
    let home = TempDir::new().unwrap();
    isolated_cmd(&home)
        .args(["example.com", "--timeout", "later"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timeout"));
}

#[test]
fn test_missing_file_rejected() {
    let home = TempDir::new().unwrap();
    isolated_cmd(&home)
        .args(["--file", "/definitely/not/here.txt", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_invalid_positional_domain_rejected() {
    let home = TempDir::new().unwrap();
    isolated_cmd(&home)
        .args(["https://example.com", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_dry_run_orders_by_rank_and_applies_limit() {
    let home = TempDir::new().unwrap();
    let file = create_candidates_file(&[
        "# candidate, score",
        "go0gle.com,0.4",
        "g00gle.com,0.9",
        "googel.com,0.1",
        "gooogle.com,0.7",
    ]);

    let stdout = stdout_of(
        isolated_cmd(&home)
            .args(["--dry-run", "-n", "3", "--file"])
            .arg(file.path()),
    );

    let first = stdout.find("g00gle.com").unwrap();
    let second = stdout.find("gooogle.com").unwrap();
    let third = stdout.find("go0gle.com").unwrap();
    assert!(first < second && second < third, "unexpected order:\n{}", stdout);
    assert!(!stdout.contains("googel.com"));
}

#[test]
fn test_dry_run_reports_invalid_lines() {
    let home = TempDir::new().unwrap();
    let file = create_candidates_file(&[
        "g00gle.com,0.9",
        "not_a_domain,0.5",
        "go0gle.com,high",
        "gooogle.com 0.3",
    ]);

    isolated_cmd(&home)
        .arg("--dry-run")
        .arg("--file")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("g00gle.com"))
        .stdout(predicate::str::contains("gooogle.com"))
        .stderr(predicate::str::contains("2 invalid entries"))
        .stderr(predicate::str::contains("Line 2"))
        .stderr(predicate::str::contains("Line 3"));
}

#[test]
fn test_file_with_only_invalid_lines_fails() {
    let home = TempDir::new().unwrap();
    let file = create_candidates_file(&["not a domain at all", "???"]);

    isolated_cmd(&home)
        .arg("--dry-run")
        .arg("--file")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid candidates"));
}

#[test]
fn test_limit_from_environment() {
    let home = TempDir::new().unwrap();
    let stdout = stdout_of(
        isolated_cmd(&home)
            .env("DV_LIMIT", "1")
            .args(["alpha.com", "beta.com", "--dry-run"]),
    );

    assert!(stdout.contains("alpha.com"));
    assert!(!stdout.contains("beta.com"));
}

#[test]
fn test_cli_limit_beats_local_config() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("domain-verify.toml"),
        "[defaults]\nlimit = 1\n",
    )
    .unwrap();

    let stdout = stdout_of(
        isolated_cmd(&home).args(["alpha.com", "beta.com", "--dry-run"]),
    );
    assert!(!stdout.contains("beta.com"));

    let stdout = stdout_of(
        isolated_cmd(&home).args(["alpha.com", "beta.com", "--dry-run", "--limit", "2"]),
    );
    assert!(stdout.contains("beta.com"));
}

#[test]
fn test_explicit_config_errors_are_fatal() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("broken.toml");
    fs::write(&config, "[defaults\nlimit = ").unwrap();

    isolated_cmd(&home)
        .args(["example.com", "--dry-run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}
