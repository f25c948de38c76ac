//! End-to-end checks for the verificador binary

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn verificador() -> Command {
    Command::cargo_bin("verificador").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    verificador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("token"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_reports_selected_environment() {
    let dir = tempfile::tempdir().unwrap();
    verificador()
        .args(["config", "--env", "qa"])
        .args(["--config-dir", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("environment=qa"));
}

#[test]
fn test_config_resolves_keys_from_properties_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("qa.properties")).unwrap();
    writeln!(file, "baseUrl=https://qa.example.test").unwrap();

    verificador()
        .args(["config", "baseUrl", "--env", "qa"])
        .args(["--config-dir", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("baseUrl=https://qa.example.test"));
}

#[test]
fn test_login_requires_a_url() {
    let dir = tempfile::tempdir().unwrap();
    verificador()
        .args(["login", "--env", "qa"])
        .args(["--config-dir", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LOGIN_URL"));
}
