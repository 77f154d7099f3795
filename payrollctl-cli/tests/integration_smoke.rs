//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// payrollctl isolated from the developer's environment and config
fn payrollctl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("payrollctl").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("PAYROLLCTL_CONFIG", home.path().join("config.toml"))
        .env("PAYROLLCTL_QUIET", "1")
        .env_remove("DATABASE_URL")
        .env_remove("PAYROLLCTL_BIND")
        .env_remove("RUST_LOG");
    cmd
}

// === Help Tests ===

#[test]
fn test_top_level_help_lists_commands() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("load"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_serve_help() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("--skip-schema"));
}

#[test]
fn test_load_help() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["load", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--keep-download"))
        .stdout(predicate::str::contains("--batch-size"));
}

#[test]
fn test_archive_help() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["archive", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_validate_help() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["validate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("department check"));
}

#[test]
fn test_migrate_help() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--from"))
        .stdout(predicate::str::contains("--to"));
}

#[test]
fn test_schema_help() {
    let home = TempDir::new().unwrap();
    payrollctl(&home).args(["schema", "--help"]).assert().success();
}

// === Argument Validation ===

#[test]
fn test_load_requires_year_or_all() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .arg("load")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--year"));
}

#[test]
fn test_migrate_requires_urls() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .env_remove("MIGRATE_SOURCE_URL")
        .env_remove("MIGRATE_TARGET_URL")
        .arg("migrate")
        .assert()
        .failure();
}

#[test]
fn test_migrate_rejects_same_database() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["migrate", "--from", "postgres://a@h/db", "--to", "postgres://a@h/db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("same database"));
}

#[test]
fn test_schema_without_database_url_fails() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .arg("schema")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

// === Config ===

#[test]
fn test_config_path_honors_override() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("(not created)"));
}

#[test]
fn test_config_show_masks_password() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .env("DATABASE_URL", "postgres://payroll:hunter2@db:5432/payroll")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://payroll:***@db:5432/payroll"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_show_reads_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        "[etl]\nbatch_size = 250\n",
    )
    .unwrap();
    payrollctl(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("batch_size = 250"));
}

#[test]
fn test_config_show_rejects_bad_toml() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "[etl\n").unwrap();
    payrollctl(&home)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid TOML"));
}

// === Completions ===

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    payrollctl(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("payrollctl"));
}
