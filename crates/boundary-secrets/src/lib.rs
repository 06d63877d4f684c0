//! Encrypted, versioned secret storage for Boundary.
//!
//! Secrets are stored one JSON record per `(name, environment)` pair,
//! encrypted with AES-256-GCM under keys derived (HKDF-SHA256) from a single
//! master key. Records carry a plaintext checksum, a monotonic version, and
//! optional lazy expiry. The master key can be rotated in a staged,
//! all-records-or-nothing pass.

pub mod crypto;
pub mod error;
pub mod files;
pub mod generate;
pub mod lock;
pub mod master_key;
pub mod store;
pub mod types;

pub use error::{Result, SecretError, SecretErrorKind};
pub use generate::{bootstrap, generate_value, ValueFormat, STANDARD_SECRETS};
pub use master_key::{KeySource, MasterKey};
pub use store::{FileSecretStore, SecretStore};
pub use types::{
    DecryptedSecret, RotationReport, SecretExport, SecretMetadata, SecretOptions, SecretRecord,
    SecretValue,
};
