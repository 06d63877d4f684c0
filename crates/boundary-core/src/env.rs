//! Environment variable handling.

use std::env;

/// Deployment environment used when nothing else selects one.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Resolve the active deployment environment from the process environment.
///
/// `BOUNDARY_ENV` wins over `NODE_ENV`, which the surrounding services still
/// set; both fall back to [`DEFAULT_ENVIRONMENT`].
pub fn active_environment() -> String {
    get_var(vars::BOUNDARY_ENV)
        .or_else(|| get_var(vars::NODE_ENV))
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Load environment variables from a .env file in the working directory.
///
/// Variables already present in the process environment are left untouched.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = std::path::Path::new(".env");
    if !path.exists() {
        return Ok(());
    }

    let content = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(key, value);
        }
    }

    Ok(())
}

/// Parse `KEY=value` lines, skipping blanks and `#` comments.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();

            // Remove quotes if present
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);

            if !key.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
    }

    pairs
}

/// Environment variable names read by Boundary.
pub mod vars {
    /// Active deployment environment.
    pub const BOUNDARY_ENV: &str = "BOUNDARY_ENV";

    /// Legacy deployment environment variable, honoured after `BOUNDARY_ENV`.
    pub const NODE_ENV: &str = "NODE_ENV";

    /// Config file override.
    pub const BOUNDARY_CONFIG: &str = "BOUNDARY_CONFIG";

    /// Secrets root directory override.
    pub const BOUNDARY_SECRETS_DIR: &str = "BOUNDARY_SECRETS_DIR";

    /// Hex-encoded master key override.
    pub const BOUNDARY_MASTER_KEY: &str = "BOUNDARY_MASTER_KEY";

    /// Home directory override (defaults to `~/.boundary`).
    pub const BOUNDARY_HOME: &str = "BOUNDARY_HOME";
}
