//! Integration tests for bootpack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use bootpack_core::test_utils::ZipTestBuilder;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn bootpack_cmd() -> Command {
    cargo_bin_cmd!("bootpack")
}

fn dependency_jar() -> Vec<u8> {
    ZipTestBuilder::new()
        .add_file("config/defaults.properties", b"port=8080\n")
        .add_deflated_file("lib/Helper.class", &[0xCA; 300])
        .build()
}

/// Writes a jar-layout package into `temp` and returns its path.
fn write_app(temp: &TempDir) -> PathBuf {
    let data = ZipTestBuilder::new()
        .add_manifest(&[
            ("Main-Class", "bootpack.JarLauncher"),
            ("Start-Class", "com.example.App"),
        ])
        .add_directory("BOOT-INF/")
        .add_directory("BOOT-INF/classes/")
        .add_file("BOOT-INF/classes/com/example/App.class", b"\xCA\xFE\xBA\xBE")
        .add_directory("BOOT-INF/lib/")
        .add_file("BOOT-INF/lib/dep.jar", &dependency_jar())
        .build();
    let path = temp.path().join("app.jar");
    std::fs::write(&path, data).unwrap();
    path
}

fn write_corrupt_app(temp: &TempDir) -> PathBuf {
    let data = ZipTestBuilder::new()
        .add_manifest(&[("Start-Class", "com.example.App")])
        .add_file("BOOT-INF/lib/broken.jar", b"this is not a zip file")
        .build();
    let path = temp.path().join("broken.jar");
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_version_flag() {
    bootpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bootpack"));
}

#[test]
fn test_help_flag() {
    bootpack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command-line utility"));
}

#[test]
fn test_list_shows_search_path_in_order() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    bootpack_cmd()
        .arg("list")
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("layout: jar"))
        .stdout(predicate::str::contains("BOOT-INF/classes/"))
        .stdout(predicate::str::contains("BOOT-INF/lib/dep.jar"))
        .stdout(predicate::str::contains("2 entries"));
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    let output = bootpack_cmd()
        .arg("--json")
        .arg("list")
        .arg(&app)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "list");
    assert_eq!(json["status"], "success");
    let elements = json["data"]["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0]["kind"], "directory");
    assert_eq!(elements[1]["kind"], "nested");
    assert_eq!(elements[1]["entries"], 2);
}

#[test]
fn test_list_with_forced_layout() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    bootpack_cmd()
        .args(["list", "--layout", "war"])
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("layout: war"))
        .stdout(predicate::str::contains("parent resolver"));
}

#[test]
fn test_verify_passes() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    bootpack_cmd()
        .args(["verify", "--deep"])
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("Verification passed"))
        .stdout(predicate::str::contains("com.example.App"));
}

#[test]
fn test_verify_reports_corrupt_nested_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_corrupt_app(&temp);

    bootpack_cmd()
        .arg("verify")
        .arg(&app)
        .assert()
        .failure()
        .stdout(predicate::str::contains("BOOT-INF/lib/broken.jar"))
        .stderr(predicate::str::contains("verification failed"));
}

#[test]
fn test_list_fails_on_corrupt_nested_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_corrupt_app(&temp);

    bootpack_cmd()
        .arg("list")
        .arg(&app)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_resolve_nested_resource() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    bootpack_cmd()
        .arg("resolve")
        .arg(&app)
        .arg("config/defaults.properties")
        .assert()
        .success()
        .stdout(predicate::str::contains("BOOT-INF/lib/dep.jar"))
        .stdout(predicate::str::contains("position 1"));
}

#[test]
fn test_resolve_module_print() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    let output = bootpack_cmd()
        .args(["resolve", "--module", "--print"])
        .arg(&app)
        .arg("com.example.App")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\xCA\xFE\xBA\xBE");
}

#[test]
fn test_resolve_deflated_entry_size() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    let output = bootpack_cmd()
        .args(["--json", "resolve"])
        .arg(&app)
        .arg("lib/Helper.class")
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["size"], 300);
    assert_eq!(json["data"]["position"], 1);
}

#[test]
fn test_resolve_missing_name() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    bootpack_cmd()
        .args(["resolve", "--module"])
        .arg(&app)
        .arg("Missing.Main")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing.Main"))
        .stderr(predicate::str::contains("bootpack list"));
}

#[test]
fn test_manifest_command() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let app = write_app(&temp);

    bootpack_cmd()
        .arg("manifest")
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.App"))
        .stdout(predicate::str::contains("jar"));

    let output = bootpack_cmd()
        .args(["--json", "manifest"])
        .arg(&app)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["entry_point"], "com.example.App");
    assert_eq!(json["data"]["attributes"]["Main-Class"], "bootpack.JarLauncher");
}

#[test]
fn test_missing_archive_file() {
    bootpack_cmd()
        .arg("list")
        .arg("/nonexistent/app.jar")
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_completion_bash() {
    bootpack_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bootpack"));
}
