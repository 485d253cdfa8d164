//! End-to-end tests for the `ward` binary
//!
//! Tests cover:
//! - `ward read` / `ward write` / `ward entries` / `ward check`
//! - Nested stores mounted from ward.toml
//! - Permission denials and exit codes
//! - Audit trail output

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const CONFIG: &str = r#"
[store]
default_policy = "rw"

[permissions]
"profile.name" = "r"
"secret" = "none"

[stores.vault]
default_policy = "none"

[stores.vault.permissions]
"label" = "r"
"notes" = "rw"
"#;

const DATA: &str = r#"{
    "profile": {"name": "Ada", "city": "London"},
    "secret": "hunter2",
    "vault": {"label": "personal", "pin": "1234"}
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ward.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("data.json"), DATA).unwrap();
        Self { dir }
    }

    fn data(&self) -> PathBuf {
        self.dir.path().join("data.json")
    }

    fn ward(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ward");
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("NO_COLOR", "1")
            .env_remove("WARD_CONFIG")
            .env_remove("WARD_DEFAULT_POLICY")
            .env_remove("WARD_AUDIT")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn json_stdout(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

// ============================================================================
// ward read
// ============================================================================

#[test]
fn test_read_value() {
    let fx = Fixture::new();

    fx.ward()
        .args(["read", "profile.name", "--data"])
        .arg(fx.data())
        .assert()
        .success()
        .stdout("\"Ada\"\n");
}

#[test]
fn test_read_colon_path() {
    let fx = Fixture::new();

    fx.ward()
        .args(["read", "profile:city", "--data"])
        .arg(fx.data())
        .assert()
        .success()
        .stdout("\"London\"\n");
}

#[test]
fn test_read_missing_prints_undefined() {
    let fx = Fixture::new();

    fx.ward()
        .args(["read", "profile.age", "--data"])
        .arg(fx.data())
        .assert()
        .success()
        .stdout("undefined\n");
}

#[test]
fn test_read_denied_fails() {
    let fx = Fixture::new();

    fx.ward()
        .args(["read", "secret", "--data"])
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied: cannot read secret"));
}

#[test]
fn test_read_through_nested_store_policy() {
    let fx = Fixture::new();

    fx.ward()
        .args(["read", "vault.label", "--data"])
        .arg(fx.data())
        .assert()
        .success()
        .stdout("\"personal\"\n");

    fx.ward()
        .args(["read", "vault.pin", "--data"])
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read vault.pin"));
}

// ============================================================================
// ward write
// ============================================================================

#[test]
fn test_write_prints_entries() {
    let fx = Fixture::new();

    let output = fx
        .ward()
        .args(["write", "profile.age", "37", "--data"])
        .arg(fx.data())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output.stdout),
        serde_json::json!({
            "profile": {"name": "Ada", "city": "London", "age": 37},
            "vault": {"label": "personal"}
        })
    );
}

#[test]
fn test_write_does_not_persist() {
    let fx = Fixture::new();

    fx.ward()
        .args(["write", "profile.city", "Paris", "--data"])
        .arg(fx.data())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(fx.data()).unwrap(), DATA);
}

#[test]
fn test_write_huge_index_succeeds() {
    let fx = Fixture::new();

    let output = fx
        .ward()
        .args(["write", "tags.18446744073709551615", "x", "--data"])
        .arg(fx.data())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output.stdout)["tags"],
        serde_json::json!({"18446744073709551615": "x"})
    );
}

#[test]
fn test_write_read_only_path_fails() {
    let fx = Fixture::new();

    fx.ward()
        .args(["write", "profile.name", "\"Grace\"", "--data"])
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Permission denied: cannot write profile.name",
        ));
}

// ============================================================================
// ward entries
// ============================================================================

#[test]
fn test_entries_hides_unreadable_paths() {
    let fx = Fixture::new();

    let output = fx
        .ward()
        .args(["entries", "--data"])
        .arg(fx.data())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output.stdout),
        serde_json::json!({
            "profile": {"name": "Ada", "city": "London"},
            "vault": {"label": "personal"}
        })
    );
}

#[test]
fn test_entries_without_data_mounts_empty_stores() {
    let fx = Fixture::new();

    let output = fx.ward().arg("entries").output().unwrap();

    assert!(output.status.success());
    assert_eq!(json_stdout(&output.stdout), serde_json::json!({"vault": {}}));
}

#[test]
fn test_entries_rejects_non_object_document() {
    let fx = Fixture::new();
    fs::write(fx.data(), "[1, 2]").unwrap();

    fx.ward()
        .args(["entries", "--data"])
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must contain a JSON object"));
}

// ============================================================================
// ward check
// ============================================================================

#[test]
fn test_check_reports_levels() {
    let fx = Fixture::new();

    fx.ward()
        .args(["check", "profile.name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("store:"))
        .stdout(predicate::str::contains("r\n"))
        .stdout(predicate::str::contains("read:        yes"))
        .stdout(predicate::str::contains("write:       no"));
}

#[test]
fn test_check_nested_store_combines_levels() {
    let fx = Fixture::new();

    fx.ward()
        .args(["check", "vault:notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vault.notes"))
        .stdout(predicate::str::contains("vault:"))
        .stdout(predicate::str::contains("write:       yes"));
}

#[test]
fn test_check_metadata_path_is_refused() {
    let fx = Fixture::new();

    fx.ward()
        .args(["check", "permissions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("none"))
        .stdout(predicate::str::contains("read:        no"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_env_default_policy_override() {
    let fx = Fixture::new();

    fx.ward()
        .env("WARD_DEFAULT_POLICY", "none")
        .args(["read", "profile.city", "--data"])
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read profile.city"));
}

#[test]
fn test_invalid_config_is_reported() {
    let fx = Fixture::new();
    fs::write(
        fx.dir.path().join("ward.toml"),
        "[permissions]\n\"a\" = \"admin\"\n",
    )
    .unwrap();

    fx.ward()
        .arg("entries")
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin"));
}

#[test]
fn test_explicit_config_path() {
    let fx = Fixture::new();
    let other = TempDir::new().unwrap();
    let config = other.path().join("strict.toml");
    fs::write(&config, "[store]\ndefault_policy = \"r\"\n").unwrap();

    fx.ward()
        .args(["write", "profile.city", "Paris", "--config"])
        .arg(&config)
        .arg("--data")
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot write profile.city"));
}

// ============================================================================
// Audit
// ============================================================================

#[test]
fn test_audit_trail_on_stderr() {
    let fx = Fixture::new();

    fx.ward()
        .args(["read", "secret", "--audit", "--data"])
        .arg(fx.data())
        .assert()
        .failure()
        .stderr(predicate::str::contains("DENIED read secret (none)"));
}

#[test]
fn test_audit_enabled_from_env() {
    let fx = Fixture::new();

    fx.ward()
        .env("WARD_AUDIT", "1")
        .args(["read", "vault.label", "--data"])
        .arg(fx.data())
        .assert()
        .success()
        .stderr(predicate::str::contains("GRANTED read vault.label (rw)"))
        .stderr(predicate::str::contains("GRANTED read label (r)"));
}
