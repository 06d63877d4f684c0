//! # boundary-core
//!
//! Core types, configuration, and utilities for Boundary.
//!
//! This crate provides shared functionality used across all Boundary crates:
//!
//! - **Configuration**: Loading and validation of the JSON5 config file
//! - **Secrets in memory**: [`SecretString`], zeroed on drop and never printed
//! - **Utilities**: Path resolution and environment handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
