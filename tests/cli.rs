//! Smoke tests for the envsync binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn envsync() -> Command {
    let mut cmd = Command::cargo_bin("envsync").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("ENVSYNC_BACKUP_DIR");
    cmd
}

#[test]
fn test_catalog_lists_builtin_resources() {
    envsync()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("addUserToGroup"))
        .stdout(predicate::str::contains("getOrgPreferences"))
        .stdout(predicate::str::contains("resource(s)"));
}

#[test]
fn test_catalog_export_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("catalog.json");

    envsync()
        .args(["catalog", "--export"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));
    assert!(file.exists());

    envsync()
        .args(["catalog", "--catalog"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("listUsers"));
}

#[test]
fn test_invalid_catalog_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("catalog.json");
    fs::write(
        &file,
        r#"{"resources": [{"name": "policy", "retrieval": "listable",
            "dependency": "dependent", "listCommand": "listRules",
            "sourceType": "policy"}]}"#,
    )
    .unwrap();

    envsync()
        .args(["catalog", "--catalog"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("own source"));
}

#[test]
fn test_restore_requires_input() {
    envsync()
        .arg("restore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_backup_needs_config_file() {
    let temp_dir = TempDir::new().unwrap();

    envsync()
        .args(["backup", "--cli", "true", "-c"])
        .arg(temp_dir.path().join("okta.yaml"))
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_restore_refuses_production_org() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("okta.yaml");
    fs::write(&config, "okta:\n  client:\n    orgUrl: https://acme.okta.com\n").unwrap();

    envsync()
        .args(["restore", "-i"])
        .arg(temp_dir.path())
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a developer org"));
}

#[test]
fn test_backup_accepts_dev_domain_on_any_line() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("okta.yaml");
    fs::write(&config, "okta:\n  client:\n    domain: https://DEV-123456.okta.com\n").unwrap();

    envsync()
        .args(["backup", "--cli", "true", "-c"])
        .arg(&config)
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Backing up https://DEV-123456.okta.com"));
}

#[test]
fn test_info_on_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    envsync()
        .args(["info", "-i"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No backup manifest found."))
        .stdout(predicate::str::contains("No ID mappings recorded."));
}

#[test]
fn test_info_shows_mapping_counts() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("id_mapping.json"),
        r#"{"group": {"g1": "n1", "g2": "n2"}}"#,
    )
    .unwrap();

    envsync()
        .args(["info", "-i"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("group"))
        .stdout(predicate::str::contains("TOTAL"));
}

#[test]
fn test_info_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();

    envsync()
        .args(["info", "-i"])
        .arg(temp_dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
