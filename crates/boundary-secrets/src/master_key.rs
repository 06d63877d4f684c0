//! Master key resolution and persistence.
//!
//! The master key is resolved in priority order:
//! 1. `BOUNDARY_MASTER_KEY` environment variable (hex-encoded)
//! 2. `{secrets_dir}/.master-key` (hex-encoded, mode 0600)
//! 3. Generate a new key and write it to `.master-key`
//!
//! During rotation the replacement key is staged in `.master-key.pending`
//! and only renamed over `.master-key` once every record has been moved to
//! it. A pending file found at startup means a rotation was interrupted
//! mid-commit; both keys are then loaded so every record stays readable.

use std::fmt;
use std::path::{Path, PathBuf};

use boundary_core::env::{get_var, vars};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_SIZE};
use crate::error::{Result, SecretError};
use crate::files;

/// File name of the active master key inside the secrets directory.
pub const MASTER_KEY_FILE: &str = ".master-key";

/// File name of a staged, not yet committed master key.
pub const PENDING_KEY_FILE: &str = ".master-key.pending";

/// A 256-bit master key. Zeroed on drop, never printed.
#[derive(Clone)]
pub struct MasterKey {
    bytes: Zeroizing<[u8; KEY_SIZE]>,
}

impl MasterKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            bytes: crypto::generate_master_key(),
        }
    }

    /// Parse a hex-encoded key, ignoring surrounding whitespace.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            hex::decode(hex_key.trim())
                .map_err(|e| SecretError::MasterKey(format!("invalid hex: {e}")))?,
        );
        if decoded.len() != KEY_SIZE {
            return Err(SecretError::MasterKey(format!(
                "key must decode to exactly {KEY_SIZE} bytes, got {}",
                decoded.len()
            )));
        }
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Hex encoding, as written to the key file.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes.as_slice()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Where the active master key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// `.master-key` inside the secrets directory.
    File(PathBuf),
    /// `BOUNDARY_MASTER_KEY`. Rotation is refused for this source because the
    /// new key could not be handed back to whoever sets the variable.
    Environment,
    /// Handed in by the caller; rotation persists the replacement to disk.
    Provided,
}

/// The keys a store may decrypt with.
#[derive(Debug, Clone)]
pub struct KeyRing {
    /// Used for every new encryption.
    pub current: MasterKey,
    /// Left behind by an interrupted rotation; tried when `current` fails.
    pub pending: Option<MasterKey>,
    pub source: KeySource,
}

impl KeyRing {
    pub fn new(current: MasterKey, source: KeySource) -> Self {
        Self {
            current,
            pending: None,
            source,
        }
    }

    /// Keys to try for decryption, most likely first.
    pub fn candidates(&self) -> impl Iterator<Item = &MasterKey> {
        std::iter::once(&self.current).chain(self.pending.iter())
    }
}

pub fn master_key_path(dir: &Path) -> PathBuf {
    dir.join(MASTER_KEY_FILE)
}

pub fn pending_key_path(dir: &Path) -> PathBuf {
    dir.join(PENDING_KEY_FILE)
}

/// Resolve the key ring for `dir`, creating a master key if none exists.
pub async fn load_or_create(dir: &Path) -> Result<KeyRing> {
    let pending = read_key_file(&pending_key_path(dir)).await?;
    if pending.is_some() {
        warn!(
            dir = %dir.display(),
            "found {PENDING_KEY_FILE}: a previous key rotation did not finish; \
             run rotation again to complete it"
        );
    }

    // 1. Environment variable.
    if let Some(hex_key) = get_var(vars::BOUNDARY_MASTER_KEY) {
        debug!("using master key from environment variable");
        let current = MasterKey::from_hex(&hex_key).map_err(|e| {
            SecretError::MasterKey(format!("{}: {e}", vars::BOUNDARY_MASTER_KEY))
        })?;
        return Ok(KeyRing {
            current,
            pending,
            source: KeySource::Environment,
        });
    }

    // 2. Key file.
    let path = master_key_path(dir);
    if let Some(current) = read_key_file(&path).await? {
        debug!(path = %path.display(), "using master key from file");
        return Ok(KeyRing {
            current,
            pending,
            source: KeySource::File(path),
        });
    }

    // 3. Generate and persist.
    files::ensure_private_dir(dir).await?;
    let current = MasterKey::generate();
    files::write_private_file(&path, current.to_hex().as_bytes()).await?;
    info!(path = %path.display(), "generated new master key");

    Ok(KeyRing {
        current,
        pending,
        source: KeySource::File(path),
    })
}

/// Read and parse a key file; `None` when it does not exist.
async fn read_key_file(path: &Path) -> Result<Option<MasterKey>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let contents = Zeroizing::new(contents);
            MasterKey::from_hex(&contents)
                .map(Some)
                .map_err(|e| SecretError::MasterKey(format!("{}: {e}", path.display())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `key` to `.master-key.pending`.
pub async fn stage_pending(dir: &Path, key: &MasterKey) -> Result<()> {
    files::write_private_file(&pending_key_path(dir), key.to_hex().as_bytes()).await
}

/// Atomically promote `.master-key.pending` to `.master-key`.
pub async fn commit_pending(dir: &Path) -> Result<()> {
    tokio::fs::rename(pending_key_path(dir), master_key_path(dir)).await?;
    files::sync_dir(dir).await;
    Ok(())
}

/// Remove a staged key. Missing file is fine.
pub async fn discard_pending(dir: &Path) -> Result<()> {
    files::remove_if_exists(&pending_key_path(dir)).await
}
