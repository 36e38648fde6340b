//! Binary-level behaviour that needs no package manager

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// `softserve` running in an empty directory with an isolated home
fn softserve(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("softserve");
    cmd.current_dir(dir.path())
        .env("SOFTSERVE_HOME", dir.path().join(".softserve"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_links_issue_tracker() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/wking-io/softserve-cli"))
        .stdout(predicate::str::contains("--here"));
}

#[test]
fn missing_name_exits_with_usage() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please specify the theme name"));
}

#[test]
fn rejects_npm_naming_violations() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .arg("My Theme")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("npm naming restrictions"))
        .stderr(predicate::str::contains("name can no longer contain capital letters"));
    assert!(!dir.path().join("My Theme").exists());
}

#[test]
fn rejects_generator_package_name() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .arg("softserve-scripts")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("a dependency with the same name exists"));
}

#[test]
fn rejects_existing_sibling_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("taken")).unwrap();
    softserve(&dir)
        .arg("taken")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("a directory with the same name exists"));
}

#[test]
fn here_requires_themes_directory() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .args(["--here", "my-theme"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("wrong location"));
    assert!(!dir.path().join("my-theme").exists());
}

#[test]
fn root_requires_wp_content() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .args(["-r", "my-theme"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("wp-content"));
}

#[test]
fn here_and_root_conflict() {
    let dir = TempDir::new().unwrap();
    softserve(&dir)
        .args(["-h", "-r", "my-theme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn info_prints_json_report() {
    let dir = TempDir::new().unwrap();
    let output = softserve(&dir)
        .args(["--info", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(report["tools"].get("node").is_some());
    assert!(report["packages"].get("softserve-scripts").is_some());
}

#[test]
fn malformed_user_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let home = dir.path().join(".softserve");
    fs::create_dir(&home).unwrap();
    fs::write(home.join("config.toml"), "use_npm = \"maybe\"").unwrap();
    softserve(&dir)
        .arg("my-theme")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}
