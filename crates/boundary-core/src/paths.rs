//! Path resolution utilities.

use crate::env::{get_var, vars};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Default secrets root, relative to the working directory.
pub const DEFAULT_SECRETS_DIR: &str = "./secrets";

/// Maximum length of a secret or environment name.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Check a secret or environment name.
///
/// Both become part of `{name}.{environment}.json`, so only ASCII
/// alphanumerics, `_` and `-` are allowed. Dots and separators are rejected so
/// the file name always splits unambiguously.
pub fn check_identifier(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "exceeds maximum length of {MAX_IDENTIFIER_LEN} characters"
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!(
            "contains invalid characters (allowed: alphanumeric, underscore, hyphen): {value}"
        ));
    }
    Ok(())
}

/// Get the Boundary base directory (`$BOUNDARY_HOME` or `~/.boundary`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = get_var(vars::BOUNDARY_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".boundary"))
}

/// Get the main config file path (`~/.boundary/boundary.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("boundary.json5"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Permission bits of `path` (Unix only; `None` elsewhere or when missing).
pub fn mode_of(path: &Path) -> Option<u32> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .ok()
            .map(|m| m.permissions().mode() & 0o777)
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        None
    }
}

/// Whether `path` is readable or writable by anyone but its owner.
pub fn is_group_or_world_accessible(path: &Path) -> bool {
    mode_of(path).map(|mode| mode & 0o077 != 0).unwrap_or(false)
}
