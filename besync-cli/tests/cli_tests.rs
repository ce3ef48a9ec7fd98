//! End-to-end tests for the `besync` binary.
//!
//! `true`/`false` stand in for rsync and ssh so no network is involved.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn besync(work: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("besync"));
    cmd.current_dir(work)
        .env_remove("BESYNC_LOG_FILE")
        .env_remove("BESYNC_LOG_DIR")
        .env_remove("BESYNC_RSYNC")
        .env_remove("BESYNC_SSH")
        .env_remove("BESYNC_CONNECT_TIMEOUT");
    cmd
}

fn write_config(work: &Path, name: &str) -> PathBuf {
    let path = work.join(name);
    fs::write(
        &path,
        r#"{"source":"/d","sourceMachines":["h1","h2"],"cachePath":"c1"}"#,
    )
    .expect("write config");
    path
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    let work = TempDir::new().unwrap();
    besync(work.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_command_fails() {
    let work = TempDir::new().unwrap();
    besync(work.path())
        .arg("frobnicate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn sync_single_config_logs_both_stages() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    besync(work.path())
        .args(["--rsync", "true", "sync", "home.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO] Stage 1: Pulling updates from 2 machines"))
        .stdout(predicate::str::contains("[SUCCESS] Pushed updates to h2"))
        .stdout(predicate::str::contains("'home' synced (2/2 pulled, 2/2 pushed)"));

    assert!(work.path().join("c1").is_dir());
    let global = fs::read_to_string(work.path().join("besync.log")).unwrap();
    let per_config = fs::read_to_string(work.path().join("configs/home.log")).unwrap();
    assert!(global.lines().count() >= 8);
    assert_eq!(global, per_config);
}

#[test]
fn failing_transfers_still_exit_zero() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    besync(work.path())
        .args(["--rsync", "false", "sync", "home.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[WARNING] Failed to pull from h1"))
        .stdout(predicate::str::contains("[WARNING] Failed to push to h2"))
        .stdout(predicate::str::contains("Sync completed for /d"));
}

#[test]
fn sync_of_empty_directory_fails() {
    let work = TempDir::new().unwrap();
    fs::create_dir(work.path().join("configs.d")).unwrap();

    besync(work.path())
        .args(["sync", "configs.d"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no config files"));
}

#[test]
fn sync_of_invalid_single_config_fails() {
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("bad.json"), r#"{"source":"/d"}"#).unwrap();

    besync(work.path())
        .args(["--rsync", "true", "sync", "bad.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("sourceMachines"));
}

#[test]
fn dry_run_lists_planned_commands() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    besync(work.path())
        .args(["sync", "home.json", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("--update"))
        .stdout(predicate::str::contains("--ignore-existing").not())
        .stdout(predicate::str::contains("h2:/d/"));

    assert!(!work.path().join("c1").exists(), "dry-run must not create the cache");
}

#[test]
fn json_summary_is_parseable() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    let output = besync(work.path())
        .args(["--rsync", "true", "sync", "home.json", "--json"])
        .output()
        .expect("run besync");
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(summary[0]["name"], "home");
    assert_eq!(summary[0]["report"]["pulls"].as_array().unwrap().len(), 2);
}

#[test]
fn custom_log_locations_are_honoured() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    besync(work.path())
        .args([
            "--rsync",
            "true",
            "--log-file",
            "logs/all.log",
            "--log-dir",
            "logs/per",
            "sync",
            "home.json",
        ])
        .assert()
        .success();

    assert!(work.path().join("logs/all.log").is_file());
    assert!(work.path().join("logs/per/home.log").is_file());
    assert!(!work.path().join("besync.log").exists());
}

#[test]
fn connect_timeout_can_come_from_the_environment() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    besync(work.path())
        .env("BESYNC_CONNECT_TIMEOUT", "7")
        .args(["sync", "home.json", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ConnectTimeout=7"));
}

#[test]
fn delete_removes_cached_file_and_contacts_all_machines() {
    let work = TempDir::new().unwrap();
    let config = write_config(work.path(), "home.json");
    fs::create_dir_all(work.path().join("c1/sub")).unwrap();
    fs::write(work.path().join("c1/sub/file.txt"), "x").unwrap();

    besync(work.path())
        .args(["--ssh", "true", "delete"])
        .arg(&config)
        .arg("/d/sub/file.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains("[SUCCESS] Deleted from cache"))
        .stdout(predicate::str::contains("[SUCCESS] Deleted sub/file.txt from h1"))
        .stdout(predicate::str::contains("[SUCCESS] Deleted sub/file.txt from h2"));

    assert!(!work.path().join("c1/sub/file.txt").exists());
    assert!(work.path().join("c1/sub").is_dir());
}

#[test]
fn delete_of_missing_path_reports_not_found() {
    let work = TempDir::new().unwrap();
    write_config(work.path(), "home.json");

    besync(work.path())
        .args(["--ssh", "false", "delete", "home.json", "nothing/here"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO] Not found in cache: nothing/here"))
        .stdout(predicate::str::contains("[ERROR] Failed to delete nothing/here from h1"))
        .stdout(predicate::str::contains("[ERROR] Failed to delete nothing/here from h2"));
}

#[test]
fn delete_with_missing_config_fails() {
    let work = TempDir::new().unwrap();

    besync(work.path())
        .args(["delete", "absent.json", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse config file"));
}
