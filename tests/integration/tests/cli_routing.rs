//! CLI binary integration tests.
//!
//! These tests exercise the compiled `boundary` binary to verify that
//! top-level command routing, help text, and error handling work as expected.

use boundary_integration_tests::{boundary_cmd, stdout};
use tempfile::TempDir;

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .arg("version")
        .output()
        .expect("failed to run boundary");
    assert!(output.status.success(), "version command should succeed");
    let stdout = stdout(&output);
    assert!(
        stdout.contains("boundary"),
        "version output should contain 'boundary', got: {}",
        stdout
    );
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .arg("--help")
        .output()
        .expect("failed to run boundary");
    assert!(output.status.success(), "--help should succeed");
    let stdout = stdout(&output);
    assert!(
        stdout.contains("secrets"),
        "help output should mention 'secrets', got: {}",
        stdout
    );
    assert!(
        stdout.contains("doctor"),
        "help output should mention 'doctor', got: {}",
        stdout
    );
}

#[test]
fn test_cli_unknown_command() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .arg("nonexistent-command")
        .output()
        .expect("failed to run boundary");
    assert!(
        !output.status.success(),
        "unknown command should return non-zero exit code"
    );
}

#[test]
fn test_cli_secrets_help_lists_operations() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .args(["secrets", "--help"])
        .output()
        .expect("failed to run boundary secrets --help");
    assert!(output.status.success(), "secrets --help should succeed");
    let stdout = stdout(&output);
    let ops = [
        "set", "get", "update", "delete", "list", "rotate", "export", "validate", "expiring",
    ];
    for op in ops {
        assert!(stdout.contains(op), "secrets help should mention '{}', got: {}", op, stdout);
    }
}

#[test]
fn test_cli_config_path_follows_home() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .args(["config", "path"])
        .output()
        .expect("failed to run boundary config path");
    assert!(output.status.success(), "config path should succeed");
    let stdout = stdout(&output);
    assert!(
        stdout.trim().ends_with("boundary.json5"),
        "config path should name boundary.json5, got: {}",
        stdout
    );
    assert!(stdout.contains(&home.path().display().to_string()));
}

#[test]
fn test_cli_doctor_help() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .args(["doctor", "--help"])
        .output()
        .expect("failed to run boundary doctor --help");
    assert!(output.status.success(), "doctor --help should succeed");
    let stdout = stdout(&output);
    assert!(
        stdout.contains("doctor") || stdout.contains("Doctor") || stdout.contains("diagnostic"),
        "doctor help should mention diagnostics, got: {}",
        stdout
    );
}

#[test]
fn test_cli_doctor_on_fresh_store() {
    let home = TempDir::new().unwrap();
    let output = boundary_cmd(home.path())
        .arg("--dir")
        .arg(home.path().join("missing"))
        .arg("doctor")
        .output()
        .expect("failed to run boundary doctor");
    assert!(output.status.success(), "doctor should only warn on a missing dir");
    assert!(stdout(&output).contains("Secrets directory missing"));
}
