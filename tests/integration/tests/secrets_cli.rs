//! End-to-end secret operations through the `boundary` binary.

use boundary_integration_tests::{boundary_cmd, run_secrets, stderr, stdout};
use tempfile::TempDir;

#[test]
fn test_secret_lifecycle() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    let out = run_secrets(
        dir,
        &["secrets", "set", "db_password", "--value", "p@ss1", "--tag", "db"],
    );
    assert!(out.status.success(), "set failed: {}", stderr(&out));
    assert!(stdout(&out).contains("version 1"));

    let out = run_secrets(dir, &["secrets", "get", "db_password"]);
    assert!(out.status.success(), "get failed: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "p@ss1");

    let out = run_secrets(dir, &["secrets", "update", "db_password", "--value", "p@ss2"]);
    assert!(out.status.success(), "update failed: {}", stderr(&out));
    assert!(stdout(&out).contains("version 2"));

    let out = run_secrets(dir, &["secrets", "get", "db_password"]);
    assert_eq!(stdout(&out).trim(), "p@ss2");

    let out = run_secrets(dir, &["secrets", "list", "--json"]);
    assert!(out.status.success());
    let list: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(list[0]["name"], "db_password");
    assert_eq!(list[0]["version"], 2);
    assert_eq!(list[0]["environment"], "test");
    assert_eq!(list[0]["tags"][0], "db");

    let out = run_secrets(dir, &["secrets", "validate", "db_password"]);
    assert!(out.status.success());

    let out = run_secrets(dir, &["secrets", "delete", "db_password"]);
    assert!(out.status.success());

    let out = run_secrets(dir, &["secrets", "get", "db_password"]);
    assert!(!out.status.success(), "get after delete should fail");

    let out = run_secrets(dir, &["secrets", "validate", "db_password"]);
    assert!(!out.status.success(), "validate after delete should fail");
}

#[test]
fn test_set_existing_requires_update() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    assert!(run_secrets(dir, &["secrets", "set", "k", "--value", "a"]).status.success());
    let out = run_secrets(dir, &["secrets", "set", "k", "--value", "b"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("already exists"));

    let out = run_secrets(dir, &["secrets", "get", "k"]);
    assert_eq!(stdout(&out).trim(), "a");
}

#[test]
fn test_export_never_contains_values() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    run_secrets(dir, &["secrets", "set", "api_key", "--value", "very-secret-value"]);
    let out = run_secrets(dir, &["secrets", "export"]);
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(!text.contains("very-secret-value"));
    let export: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(export["environment"], "test");
    assert_eq!(export["secrets"][0]["name"], "api_key");
    assert!(export["secrets"][0]["metadata"].get("value").is_none());
}

#[test]
fn test_rotation_keeps_values() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    run_secrets(dir, &["secrets", "set", "a", "--value", "one"]);
    run_secrets(dir, &["secrets", "set", "b", "--value", "two"]);
    let key_file = dir.join("secrets").join(".master-key");
    let before = std::fs::read_to_string(&key_file).unwrap();

    let out = run_secrets(dir, &["secrets", "rotate"]);
    assert!(!out.status.success(), "rotate without --yes should refuse");

    let out = run_secrets(dir, &["secrets", "rotate", "--yes"]);
    assert!(out.status.success(), "rotate failed: {}", stderr(&out));
    assert!(stdout(&out).contains("Re-encrypted 2"));

    let after = std::fs::read_to_string(&key_file).unwrap();
    assert_ne!(before, after);
    assert!(!dir.join("secrets").join(".master-key.pending").exists());

    assert_eq!(stdout(&run_secrets(dir, &["secrets", "get", "a"])).trim(), "one");
    assert_eq!(stdout(&run_secrets(dir, &["secrets", "get", "b"])).trim(), "two");
}

#[cfg(unix)]
#[test]
fn test_files_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let home = TempDir::new().unwrap();
    let dir = home.path();
    run_secrets(dir, &["secrets", "set", "k", "--value", "v"]);

    let secrets = dir.join("secrets");
    for file in [secrets.join(".master-key"), secrets.join("k.test.json")] {
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "{} should be 0600", file.display());
    }
}

#[test]
fn test_environment_master_key() {
    let home = TempDir::new().unwrap();
    let dir = home.path();
    let key = "ab".repeat(32);

    let run = |args: &[&str]| {
        boundary_cmd(dir)
            .env("BOUNDARY_MASTER_KEY", &key)
            .arg("--dir")
            .arg(dir.join("secrets"))
            .args(["--env", "test"])
            .args(args)
            .output()
            .unwrap()
    };

    assert!(run(&["secrets", "set", "k", "--value", "v"]).status.success());
    assert!(!dir.join("secrets").join(".master-key").exists());
    assert_eq!(stdout(&run(&["secrets", "get", "k"])).trim(), "v");

    let out = run(&["secrets", "rotate", "--yes"]);
    assert!(!out.status.success(), "rotation must be refused for env keys");
    assert!(stderr(&out).contains("BOUNDARY_MASTER_KEY"));

    // A store opened without the variable generates a different key.
    let out = run_secrets(dir, &["secrets", "get", "k"]);
    assert!(!out.status.success());
}

#[test]
fn test_expiring_and_generate() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    run_secrets(dir, &["secrets", "set", "soon", "--value", "x", "--expires-in-days", "3"]);
    run_secrets(dir, &["secrets", "set", "later", "--value", "y", "--expires-in-days", "90"]);
    run_secrets(dir, &["secrets", "set", "never", "--value", "z"]);

    let out = run_secrets(dir, &["secrets", "expiring", "--days", "7"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("soon"));
    assert!(!text.contains("later"));
    assert!(!text.contains("never"));

    let out = run_secrets(dir, &["secrets", "generate", "token", "--bytes", "16", "--print"]);
    assert!(out.status.success(), "generate failed: {}", stderr(&out));
    let printed = stdout(&out).lines().last().unwrap().to_string();
    assert_eq!(printed.len(), 32);
    assert_eq!(stdout(&run_secrets(dir, &["secrets", "get", "token"])).trim(), printed);
}

#[test]
fn test_out_of_range_expiry_is_an_error() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    let out = run_secrets(
        dir,
        &["secrets", "set", "k", "--value", "v", "--expires-in-days", "4294967295"],
    );
    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("out of range"));

    run_secrets(dir, &["secrets", "set", "k", "--value", "v", "--expires-in-days", "5"]);
    let out = run_secrets(dir, &["secrets", "expiring", "--days", "4294967295"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("k"));
}

#[test]
fn test_bootstrap_is_idempotent() {
    let home = TempDir::new().unwrap();
    let dir = home.path();

    let out = run_secrets(dir, &["secrets", "bootstrap"]);
    assert!(out.status.success(), "bootstrap failed: {}", stderr(&out));
    assert!(stdout(&out).contains("jwt_secret"));

    let out = run_secrets(dir, &["secrets", "bootstrap"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("already exist"));

    let out = run_secrets(dir, &["secrets", "get", "mcp_api_key"]);
    assert!(stdout(&out).starts_with("bk-"));
}
