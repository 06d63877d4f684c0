//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values.

use boundary_core::config::{Config, LogLevel};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("boundary.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.secrets.dir, config.secrets.dir);
    assert_eq!(loaded.secrets.expiry_warning_days, config.secrets.expiry_warning_days);
    assert_eq!(loaded.secrets.environment, None);
    assert_eq!(loaded.logging.level, LogLevel::Info);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("boundary.json5");

    let mut config = Config::default();
    config.secrets.dir = PathBuf::from("/var/lib/boundary");
    config.secrets.environment = Some("production".to_string());
    config.logging.json = true;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.secrets.dir, PathBuf::from("/var/lib/boundary"));
    assert_eq!(loaded.active_environment(), "production");
    assert!(loaded.logging.json);
}

#[test]
fn test_config_json5_comments() {
    let config = Config::parse(
        r#"{
            // trailing commas and comments are allowed
            secrets: { dir: "/srv/secrets", expiry_warning_days: 14, },
        }"#,
    )
    .unwrap();
    assert_eq!(config.secrets.expiry_warning_days, 14);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/boundary.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}
