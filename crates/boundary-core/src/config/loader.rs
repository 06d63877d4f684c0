//! Configuration loading and persistence.

use super::Config;
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound for the expiry look-ahead window, about a century.
pub const MAX_EXPIRY_WARNING_DAYS: u32 = 36_500;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "loading configuration");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Resolve the configuration the way the CLI does.
    ///
    /// An explicit path must exist. Without one, `BOUNDARY_CONFIG` is tried,
    /// then the default file; a missing default file yields defaults.
    /// Environment overrides are applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::get_var(vars::BOUNDARY_CONFIG).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load(&path)?,
            None => match Self::load_default() {
                Ok(config) => config,
                Err(ConfigError::NotFound(_)) => Self::default(),
                Err(e) => return Err(e),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `BOUNDARY_SECRETS_DIR` and `BOUNDARY_ENV` on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = env::get_var(vars::BOUNDARY_SECRETS_DIR) {
            self.secrets.dir = paths::expand_tilde(&dir);
        }
        if let Some(environment) = env::get_var(vars::BOUNDARY_ENV) {
            self.secrets.environment = Some(environment);
        }
    }

    /// The environment operations default to when none is given.
    pub fn active_environment(&self) -> String {
        self.secrets
            .environment
            .clone()
            .unwrap_or_else(env::active_environment)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        debug!(path = %path.display(), "saved configuration");

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.secrets.dir.as_os_str().is_empty() {
            errors.push("Secrets dir must not be empty".to_string());
        }

        if self.secrets.expiry_warning_days == 0 {
            errors.push("Expiry warning window must be at least 1 day".to_string());
        } else if self.secrets.expiry_warning_days > MAX_EXPIRY_WARNING_DAYS {
            errors.push(format!(
                "Expiry warning window must be at most {} days",
                MAX_EXPIRY_WARNING_DAYS
            ));
        }

        if let Some(environment) = &self.secrets.environment {
            if let Err(reason) = paths::check_identifier(environment) {
                errors.push(format!("Invalid environment '{}': {}", environment, reason));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
