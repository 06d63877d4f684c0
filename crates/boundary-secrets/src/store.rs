//! Secret storage backends.
//!
//! Defines the [`SecretStore`] trait and provides [`FileSecretStore`], a
//! file-system-backed implementation that keeps each secret as an encrypted
//! JSON record at `{base_dir}/{name}.{environment}.json`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use boundary_core::paths::check_identifier;
use boundary_core::secret::constant_time_eq;
use boundary_core::Config;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::crypto::{self, Sealed};
use crate::error::{Result, SecretError};
use crate::files;
use crate::lock::RecordLocks;
use crate::master_key::{self, KeyRing, KeySource, MasterKey};
use crate::types::{
    timestamp, DecryptedSecret, ExportEntry, RotationReport, SecretExport, SecretMetadata,
    SecretOptions, SecretRecord, SecretValue,
};

/// Suffix of record files staged during key rotation.
const ROTATION_SUFFIX: &str = "rotating";

/// Async trait for secret storage backends.
///
/// `environment` arguments default to the store's active environment when
/// `None`.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Create a new secret at version 1.
    ///
    /// Fails with [`SecretError::AlreadyExists`] if the record is present;
    /// use [`SecretStore::update`] to replace a value.
    async fn store(&self, name: &str, value: &str, options: SecretOptions)
        -> Result<SecretMetadata>;

    /// Decrypt a secret. Missing and expired secrets yield `Ok(None)`.
    async fn get(&self, name: &str, environment: Option<&str>) -> Result<Option<DecryptedSecret>>;

    /// Re-encrypt an existing secret with a new value and bump its version,
    /// or create it if absent.
    async fn update(&self, name: &str, value: &str, options: SecretOptions)
        -> Result<SecretMetadata>;

    /// Remove a secret. Removing a missing secret succeeds.
    async fn delete(&self, name: &str, environment: Option<&str>) -> Result<()>;

    /// Whether a record file exists, without decrypting it.
    async fn exists(&self, name: &str, environment: Option<&str>) -> Result<bool>;

    /// Metadata of every readable record in an environment, sorted by name.
    async fn list(&self, environment: Option<&str>) -> Result<Vec<SecretMetadata>>;

    /// Replace the master key and re-encrypt every record in every
    /// environment under it.
    async fn rotate_master_key(&self) -> Result<RotationReport>;

    /// JSON backup report with metadata only, never values.
    async fn export(&self, environment: Option<&str>) -> Result<String>;

    /// `true` only if the secret exists, is unexpired, and decrypts cleanly.
    async fn validate(&self, name: &str, environment: Option<&str>) -> bool {
        match self.get(name, environment).await {
            Ok(value) => value.is_some(),
            Err(e) => {
                debug!(name, "validation failed: {e}");
                false
            }
        }
    }

    /// Secrets whose expiry falls within the next `days` days (or has passed).
    async fn expiring(&self, days: u32, environment: Option<&str>) -> Result<Vec<SecretMetadata>> {
        let now = Utc::now();
        Ok(self
            .list(environment)
            .await?
            .into_iter()
            .filter(|meta| meta.expires_within(days, now))
            .collect())
    }
}

/// A file-system-backed secret store.
///
/// Construct one per process and share it (e.g. behind an `Arc`); the
/// in-process record locks only coordinate callers of the same instance.
pub struct FileSecretStore {
    base_dir: PathBuf,
    default_environment: String,
    keys: RwLock<KeyRing>,
    locks: RecordLocks,
}

impl FileSecretStore {
    /// Open a store rooted at `base_dir`, resolving or creating its master key.
    pub async fn open(base_dir: PathBuf, default_environment: impl Into<String>) -> Result<Self> {
        let default_environment = default_environment.into();
        validate_environment(&default_environment)?;
        let keys = master_key::load_or_create(&base_dir).await?;
        Ok(Self::from_parts(base_dir, default_environment, keys))
    }

    /// Open the store described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::open(config.secrets.dir.clone(), config.active_environment()).await
    }

    /// Create a store with a caller-supplied master key.
    pub fn with_master_key(
        base_dir: PathBuf,
        default_environment: impl Into<String>,
        master_key: MasterKey,
    ) -> Self {
        Self::from_parts(
            base_dir,
            default_environment.into(),
            KeyRing::new(master_key, KeySource::Provided),
        )
    }

    fn from_parts(base_dir: PathBuf, default_environment: String, keys: KeyRing) -> Self {
        Self {
            base_dir,
            default_environment,
            keys: RwLock::new(keys),
            locks: RecordLocks::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Environment used when an operation does not name one.
    pub fn default_environment(&self) -> &str {
        &self.default_environment
    }

    /// Where the active master key came from.
    pub async fn key_source(&self) -> KeySource {
        self.keys.read().await.source.clone()
    }

    /// Whether an unfinished rotation left a second key behind.
    pub async fn has_pending_rotation(&self) -> bool {
        self.keys.read().await.pending.is_some()
    }

    fn resolve_environment(&self, environment: Option<&str>) -> Result<String> {
        let environment = environment.unwrap_or(&self.default_environment);
        validate_environment(environment)?;
        Ok(environment.to_string())
    }

    /// Resolve the path for a record file.
    fn secret_path(&self, name: &str, environment: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.{environment}.json"))
    }

    /// Create a record under `keys.current`. Caller holds the record lock.
    async fn create_locked(
        &self,
        keys: &KeyRing,
        name: &str,
        environment: &str,
        value: &str,
        options: SecretOptions,
    ) -> Result<SecretMetadata> {
        let now = timestamp::now();
        let record = SecretRecord {
            metadata: SecretMetadata {
                name: name.to_string(),
                version: 1,
                created_at: now,
                updated_at: now,
                expires_at: options.expires_at.map(timestamp::truncate),
                description: options.description,
                tags: options.tags.unwrap_or_default(),
                environment: environment.to_string(),
            },
            value: seal(&keys.current, value)?,
        };

        files::ensure_private_dir(&self.base_dir).await?;
        let path = self.secret_path(name, environment);
        write_record(&path, &record).await?;
        info!(name, environment, "secret stored");
        Ok(record.metadata)
    }

    /// Every parseable record file in the directory, across environments.
    async fn scan_records(&self) -> Result<Vec<(PathBuf, SecretRecord)>> {
        let mut records = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".json") && !n.starts_with('.'))
                .unwrap_or(false);
            if !is_record {
                continue;
            }

            match read_record(&path).await {
                Ok(Some(record)) => records.push((path, record)),
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), "skipping malformed secret file: {e}");
                }
            }
        }

        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// Write every re-encrypted record to its staging file and the new key
    /// to `.master-key.pending`. Returns `(staged, final)` path pairs.
    async fn stage_rotation(
        &self,
        new_key: &MasterKey,
        records: Vec<(PathBuf, SecretRecord, DecryptedSecret)>,
        staged: &mut Vec<(PathBuf, PathBuf)>,
    ) -> Result<()> {
        master_key::stage_pending(&self.base_dir, new_key).await?;

        for (path, mut record, plaintext) in records {
            // Only the encrypted value changes; metadata stays untouched.
            record.value = seal(new_key, plaintext.expose())?;
            let staging = files::sibling(&path, ROTATION_SUFFIX);
            let json = serde_json::to_string_pretty(&record)?;
            staged.push((staging.clone(), path));
            files::write_private_file(&staging, json.as_bytes()).await?;
        }
        Ok(())
    }
}

/// Validate a secret name. The rule is shared with config validation.
fn validate_name(name: &str) -> Result<()> {
    check_identifier(name).map_err(SecretError::InvalidName)
}

fn validate_environment(environment: &str) -> Result<()> {
    check_identifier(environment).map_err(SecretError::InvalidEnvironment)
}

/// Encrypt `plaintext` under `key` into a fresh record value.
fn seal(key: &MasterKey, plaintext: &str) -> Result<SecretValue> {
    let sealed = crypto::encrypt(key.as_bytes(), plaintext.as_bytes())?;
    Ok(SecretValue {
        data: hex::encode(&sealed.ciphertext),
        checksum: crypto::checksum(plaintext.as_bytes()),
        algorithm: crypto::ALGORITHM.to_string(),
        key_id: crypto::generate_key_id(),
        salt: hex::encode(&sealed.salt),
        iv: hex::encode(&sealed.nonce),
        tag: hex::encode(&sealed.tag),
    })
}

/// Decrypt a record with the first key that authenticates it, then verify
/// the plaintext checksum.
fn open_record(keys: &KeyRing, record: &SecretRecord) -> Result<DecryptedSecret> {
    let value = &record.value;
    if value.algorithm != crypto::ALGORITHM {
        return Err(SecretError::CryptoError(format!(
            "unsupported algorithm: {}",
            value.algorithm
        )));
    }

    let decode = |field: &str, hex_value: &str| {
        hex::decode(hex_value).map_err(|e| {
            SecretError::IntegrityFailure(format!("{field} is not valid hex: {e}"))
        })
    };
    let sealed = Sealed {
        ciphertext: decode("data", &value.data)?,
        salt: decode("salt", &value.salt)?,
        nonce: decode("iv", &value.iv)?,
        tag: decode("tag", &value.tag)?,
    };

    let mut last_err = None;
    let mut plaintext = None;
    for key in keys.candidates() {
        match crypto::decrypt(key.as_bytes(), &sealed) {
            Ok(bytes) => {
                plaintext = Some(bytes);
                break;
            }
            Err(e) => last_err = Some(e),
        }
    }
    let plaintext = match (plaintext, last_err) {
        (Some(bytes), _) => bytes,
        (None, Some(e)) => return Err(e),
        (None, None) => {
            return Err(SecretError::CryptoError("no master key available".to_string()))
        }
    };

    let computed = crypto::checksum(&plaintext);
    if !constant_time_eq(computed.as_bytes(), value.checksum.as_bytes()) {
        return Err(SecretError::IntegrityFailure(format!(
            "checksum mismatch for {}",
            record.metadata.name
        )));
    }

    let text = std::str::from_utf8(&plaintext).map_err(|e| {
        SecretError::IntegrityFailure(format!("plaintext is not valid UTF-8: {e}"))
    })?;
    Ok(DecryptedSecret::new(text))
}

/// Read and parse a record; `None` when the file does not exist.
async fn read_record(path: &Path) -> Result<Option<SecretRecord>> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

/// Serialize `record` and atomically replace the file at `path` (mode 0600).
async fn write_record(path: &Path, record: &SecretRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    debug!(path = %path.display(), version = record.metadata.version, "writing secret");
    files::write_private_atomic(path, json.as_bytes()).await
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn store(
        &self,
        name: &str,
        value: &str,
        options: SecretOptions,
    ) -> Result<SecretMetadata> {
        validate_name(name)?;
        let environment = self.resolve_environment(options.environment.as_deref())?;

        let _guard = self.locks.acquire(name, &environment).await;
        let keys = self.keys.read().await;

        let path = self.secret_path(name, &environment);
        if tokio::fs::try_exists(&path).await? {
            return Err(SecretError::AlreadyExists(format!("{name} ({environment})")));
        }

        self.create_locked(&keys, name, &environment, value, options)
            .await
    }

    async fn get(&self, name: &str, environment: Option<&str>) -> Result<Option<DecryptedSecret>> {
        validate_name(name)?;
        let environment = self.resolve_environment(environment)?;

        let keys = self.keys.read().await;
        let path = self.secret_path(name, &environment);
        let Some(record) = read_record(&path).await? else {
            debug!(name, environment, "secret not found");
            return Ok(None);
        };

        if record.metadata.is_expired(Utc::now()) {
            warn!(
                name,
                environment,
                expires_at = ?record.metadata.expires_at,
                "secret has expired"
            );
            return Ok(None);
        }

        let secret = open_record(&keys, &record)?;
        debug!(name, environment, version = record.metadata.version, "read secret");
        Ok(Some(secret))
    }

    async fn update(
        &self,
        name: &str,
        value: &str,
        options: SecretOptions,
    ) -> Result<SecretMetadata> {
        validate_name(name)?;
        let environment = self.resolve_environment(options.environment.as_deref())?;

        let _guard = self.locks.acquire(name, &environment).await;
        let keys = self.keys.read().await;

        let path = self.secret_path(name, &environment);
        let Some(mut record) = read_record(&path).await? else {
            debug!(name, environment, "secret absent, creating");
            return self
                .create_locked(&keys, name, &environment, value, options)
                .await;
        };

        let meta = &mut record.metadata;
        meta.version += 1;
        meta.updated_at = timestamp::now();
        if let Some(description) = options.description {
            meta.description = Some(description);
        }
        if let Some(tags) = options.tags {
            meta.tags = tags;
        }
        if let Some(expires_at) = options.expires_at {
            meta.expires_at = Some(timestamp::truncate(expires_at));
        }
        record.value = seal(&keys.current, value)?;

        write_record(&path, &record).await?;
        info!(name, environment, version = record.metadata.version, "secret updated");
        Ok(record.metadata)
    }

    async fn delete(&self, name: &str, environment: Option<&str>) -> Result<()> {
        validate_name(name)?;
        let environment = self.resolve_environment(environment)?;

        let _guard = self.locks.acquire(name, &environment).await;
        let _keys = self.keys.read().await;

        let path = self.secret_path(name, &environment);
        debug!(name, environment, path = %path.display(), "deleting secret");
        files::remove_if_exists(&path).await?;
        Ok(())
    }

    async fn exists(&self, name: &str, environment: Option<&str>) -> Result<bool> {
        validate_name(name)?;
        let environment = self.resolve_environment(environment)?;
        Ok(tokio::fs::try_exists(self.secret_path(name, &environment)).await?)
    }

    async fn list(&self, environment: Option<&str>) -> Result<Vec<SecretMetadata>> {
        let environment = self.resolve_environment(environment)?;
        let suffix = format!(".{environment}.json");

        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut secrets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(name) = file_name.strip_suffix(&suffix) else {
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }

            match read_record(&path).await {
                Ok(Some(record)) => secrets.push(record.metadata),
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), "failed to read secret file: {e}");
                }
            }
        }

        secrets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(secrets)
    }

    async fn rotate_master_key(&self) -> Result<RotationReport> {
        let mut keys = self.keys.write().await;
        if keys.source == KeySource::Environment {
            return Err(SecretError::MasterKey(
                "master key is supplied via BOUNDARY_MASTER_KEY; unset it to rotate".to_string(),
            ));
        }

        info!(dir = %self.base_dir.display(), "rotating master key");

        // Phase 1: decrypt everything under the current key(s). Expired
        // records are included so they survive rotation.
        let mut decrypted = Vec::new();
        for (path, record) in self.scan_records().await? {
            let plaintext = open_record(&keys, &record).map_err(|e| {
                SecretError::Rotation(format!("cannot decrypt {}: {e}", path.display()))
            })?;
            decrypted.push((path, record, plaintext));
        }
        let rotated = decrypted.len();

        // Phase 2: stage the new key and every re-encrypted record.
        files::ensure_private_dir(&self.base_dir).await?;
        let new_key = MasterKey::generate();
        let mut staged = Vec::with_capacity(rotated);
        if let Err(e) = self.stage_rotation(&new_key, decrypted, &mut staged).await {
            for (staging, _) in &staged {
                let _ = files::remove_if_exists(staging).await;
            }
            let _ = master_key::discard_pending(&self.base_dir).await;
            warn!("key rotation aborted before commit: {e}");
            return Err(SecretError::Rotation(e.to_string()));
        }

        // Phase 3: commit. From here on records may be under either key, so
        // keep both available until the new key file is in place.
        keys.pending = Some(new_key.clone());
        for (staging, path) in &staged {
            tokio::fs::rename(staging, path).await.map_err(|e| {
                SecretError::Rotation(format!(
                    "commit interrupted at {}: {e}; rerun rotation to finish",
                    path.display()
                ))
            })?;
        }
        files::sync_dir(&self.base_dir).await;
        master_key::commit_pending(&self.base_dir).await?;

        *keys = KeyRing::new(
            new_key,
            KeySource::File(master_key::master_key_path(&self.base_dir)),
        );
        info!(rotated, "master key rotated");
        Ok(RotationReport { rotated })
    }

    async fn export(&self, environment: Option<&str>) -> Result<String> {
        let environment = self.resolve_environment(environment)?;
        let secrets = self.list(Some(&environment)).await?;

        let report = SecretExport {
            exported_at: Utc::now(),
            environment,
            secrets: secrets
                .into_iter()
                .map(|metadata| ExportEntry {
                    name: metadata.name.clone(),
                    metadata,
                })
                .collect(),
        };

        Ok(serde_json::to_string_pretty(&report)?)
    }
}
