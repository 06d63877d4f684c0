//! Core types for secret management.
//!
//! [`SecretRecord`] is the on-disk unit (`{name}.{environment}.json`): public
//! [`SecretMetadata`] next to an encrypted [`SecretValue`]. Decrypted values
//! only ever live in a [`DecryptedSecret`].

use std::collections::BTreeSet;
use std::fmt;

use boundary_core::SecretString;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Public description of a stored secret. Safe to list, log, and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretMetadata {
    pub name: String,

    /// Starts at 1 and grows by exactly one per update.
    pub version: u64,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    pub environment: String,
}

impl SecretMetadata {
    /// Whether the secret is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now > at).unwrap_or(false)
    }

    /// Whether an expiry is set and falls on or before `now + days`.
    ///
    /// Already-expired secrets are included.
    /// A window reaching past the representable range has no upper bound.
    pub fn expires_within(&self, days: u32, now: DateTime<Utc>) -> bool {
        let cutoff = now.checked_add_signed(Duration::days(i64::from(days)));
        match (self.expires_at, cutoff) {
            (Some(at), Some(cutoff)) => at <= cutoff,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Encrypted value plus everything needed to reverse the encryption.
///
/// All binary fields are lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretValue {
    /// Ciphertext without the authentication tag.
    pub data: String,

    /// SHA-256 of the plaintext.
    pub checksum: String,

    pub algorithm: String,

    /// Regenerated on every write.
    pub key_id: String,

    pub salt: String,
    pub iv: String,
    pub tag: String,
}

/// The persisted unit, one file per `(name, environment)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub metadata: SecretMetadata,
    pub value: SecretValue,
}

/// Optional inputs to `store` / `update`.
///
/// For updates, any field left as `None` keeps the record's current value.
#[derive(Debug, Clone, Default)]
pub struct SecretOptions {
    pub description: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Defaults to the store's active environment.
    pub environment: Option<String>,
}

impl SecretOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// A decrypted secret held in memory.
///
/// Wraps `SecretString` so the plaintext is zeroed on drop. Debug and Display
/// both emit `[REDACTED]` to prevent accidental logging.
pub struct DecryptedSecret {
    inner: SecretString,
}

impl DecryptedSecret {
    /// Create a new decrypted secret from raw plaintext.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::new(value),
        }
    }

    /// Expose the plaintext value. Use sparingly.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for DecryptedSecret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Backup report produced by `export`. Carries metadata only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretExport {
    #[serde(with = "timestamp")]
    pub exported_at: DateTime<Utc>,
    pub environment: String,
    pub secrets: Vec<ExportEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub name: String,
    pub metadata: SecretMetadata,
}

/// Outcome of a completed master key rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationReport {
    /// Records re-encrypted under the new key, across all environments.
    pub rotated: usize,
}

/// ISO-8601 UTC timestamps with millisecond precision, e.g.
/// `2025-01-31T09:30:00.000Z`.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Drop sub-millisecond precision so in-memory values equal what is persisted.
    pub fn truncate(at: DateTime<Utc>) -> DateTime<Utc> {
        at.trunc_subsecs(3)
    }

    /// The current time at persisted precision.
    pub fn now() -> DateTime<Utc> {
        truncate(Utc::now())
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => super::serialize(at, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|at| at.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}
