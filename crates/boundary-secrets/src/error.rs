//! Error types for secret management.

use thiserror::Error;

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret expired: {0}")]
    Expired(String),

    #[error("Secret already exists: {0}")]
    AlreadyExists(String),

    #[error("Secret integrity check failed: {0}")]
    IntegrityFailure(String),

    #[error("Crypto error: {0}")]
    CryptoError(String),

    #[error("Master key error: {0}")]
    MasterKey(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Key rotation failed: {0}")]
    Rotation(String),

    #[error("Invalid secret name: {0}")]
    InvalidName(String),

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of [`SecretError`] for callers that branch on
/// outcome rather than on message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretErrorKind {
    NotFound,
    Expired,
    IntegrityFailure,
    StorageError,
    CryptoError,
    Invalid,
}

impl SecretError {
    /// Classify this error.
    pub fn kind(&self) -> SecretErrorKind {
        match self {
            SecretError::NotFound(_) => SecretErrorKind::NotFound,
            SecretError::Expired(_) => SecretErrorKind::Expired,
            SecretError::IntegrityFailure(_) => SecretErrorKind::IntegrityFailure,
            SecretError::CryptoError(_) | SecretError::MasterKey(_) => {
                SecretErrorKind::CryptoError
            }
            SecretError::StorageError(_)
            | SecretError::Rotation(_)
            | SecretError::Io(_)
            | SecretError::Json(_) => SecretErrorKind::StorageError,
            SecretError::AlreadyExists(_)
            | SecretError::InvalidName(_)
            | SecretError::InvalidEnvironment(_) => SecretErrorKind::Invalid,
        }
    }
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
