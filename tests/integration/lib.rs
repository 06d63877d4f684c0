//! Helpers for driving the compiled `boundary` binary from integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Locate the compiled `boundary` binary in the workspace target directory.
///
/// Cargo sets `CARGO_MANIFEST_DIR` to this package's directory; the binary
/// lives in `target/debug/` at the workspace root.
pub fn boundary_bin() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> workspace root
    let workspace_root = manifest_dir
        .parent()
        .expect("tests/ parent")
        .parent()
        .expect("workspace root");
    let bin = workspace_root.join("target").join("debug").join("boundary");
    assert!(
        bin.exists(),
        "boundary binary not found at {}; run `cargo build -p boundary-cli` first",
        bin.display()
    );
    bin
}

/// A `boundary` command isolated from the caller's environment.
///
/// `home` becomes `BOUNDARY_HOME` and the working directory, so neither a
/// user config file nor a stray `.env` leaks into the run.
pub fn boundary_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(boundary_bin());
    cmd.current_dir(home)
        .env("BOUNDARY_HOME", home)
        .env_remove("BOUNDARY_CONFIG")
        .env_remove("BOUNDARY_SECRETS_DIR")
        .env_remove("BOUNDARY_MASTER_KEY")
        .env_remove("BOUNDARY_ENV")
        .env_remove("NODE_ENV")
        .env_remove("RUST_LOG");
    cmd
}

/// Run `boundary --dir <home>/secrets --env test <args...>`.
pub fn run_secrets(home: &Path, args: &[&str]) -> Output {
    boundary_cmd(home)
        .arg("--dir")
        .arg(home.join("secrets"))
        .args(["--env", "test"])
        .args(args)
        .output()
        .expect("failed to run boundary")
}

/// Stdout as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as a string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
