//! AES-256-GCM encryption with HKDF-SHA256 key derivation.
//!
//! Each record gets a unique random salt and nonce; the master key is never
//! used directly as a cipher key. The nonce goes straight into the AEAD and
//! the authentication tag is kept separate from the ciphertext, matching the
//! `data` / `iv` / `tag` fields of a record file.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Result, SecretError};

/// Cipher identifier written to every record.
pub const ALGORITHM: &str = "aes-256-gcm";

/// Master and derived key length in bytes.
pub const KEY_SIZE: usize = 32;

pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const SALT_SIZE: usize = 16;
const KEY_ID_SIZE: usize = 8;

/// HKDF info string used to domain-separate derived keys. Also bound into
/// every ciphertext as associated data.
const KDF_CONTEXT: &[u8] = b"boundary-secrets-manager-v1";

/// Output of one encryption: everything needed to reverse it except the
/// master key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Fill a fresh array from the thread-local CSPRNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Derive a 256-bit encryption key from `master_key` and `salt` via HKDF-SHA256.
fn derive_key(master_key: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_SIZE]> {
    let hk = Hkdf::<Sha256>::new(Some(salt), master_key);
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    // expand cannot fail when output length <= 255 * hash-length
    hk.expand(KDF_CONTEXT, okm.as_mut_slice())
        .expect("HKDF expand should not fail for 32-byte output");
    okm
}

/// Encrypt `plaintext` under a key derived from `master_key` and a fresh salt.
///
/// Salt and nonce are generated per call, so encrypting the same plaintext
/// twice never produces the same output.
pub fn encrypt(master_key: &[u8], plaintext: &[u8]) -> Result<Sealed> {
    let salt = random_bytes::<SALT_SIZE>();
    let nonce_bytes = random_bytes::<NONCE_SIZE>();

    let key = derive_key(master_key, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| SecretError::CryptoError(e.to_string()))?;

    let mut combined = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: KDF_CONTEXT,
            },
        )
        .map_err(|e| SecretError::CryptoError(e.to_string()))?;

    // aes-gcm appends the tag; records store it in its own field.
    let tag = combined.split_off(combined.len() - TAG_SIZE);

    Ok(Sealed {
        ciphertext: combined,
        salt: salt.to_vec(),
        nonce: nonce_bytes.to_vec(),
        tag,
    })
}

/// Decrypt a [`Sealed`] value produced by [`encrypt`].
///
/// A wrong key, a modified ciphertext/tag/nonce, or malformed parameter
/// lengths all fail with [`SecretError::IntegrityFailure`].
pub fn decrypt(master_key: &[u8], sealed: &Sealed) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.nonce.len() != NONCE_SIZE {
        return Err(SecretError::IntegrityFailure(format!(
            "iv must be {NONCE_SIZE} bytes, got {}",
            sealed.nonce.len()
        )));
    }
    if sealed.tag.len() != TAG_SIZE {
        return Err(SecretError::IntegrityFailure(format!(
            "tag must be {TAG_SIZE} bytes, got {}",
            sealed.tag.len()
        )));
    }
    if sealed.salt.is_empty() {
        return Err(SecretError::IntegrityFailure("salt is empty".to_string()));
    }

    let key = derive_key(master_key, &sealed.salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| SecretError::CryptoError(e.to_string()))?;

    let mut combined = Vec::with_capacity(sealed.ciphertext.len() + TAG_SIZE);
    combined.extend_from_slice(&sealed.ciphertext);
    combined.extend_from_slice(&sealed.tag);

    cipher
        .decrypt(
            Nonce::from_slice(&sealed.nonce),
            Payload {
                msg: &combined,
                aad: KDF_CONTEXT,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| SecretError::IntegrityFailure("authentication tag mismatch".to_string()))
}

/// Lowercase hex SHA-256 of `data`.
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Fresh opaque identifier for one key derivation.
pub fn generate_key_id() -> String {
    hex::encode(random_bytes::<KEY_ID_SIZE>())
}

/// Generate a new random 256-bit master key.
pub fn generate_master_key() -> Zeroizing<[u8; KEY_SIZE]> {
    Zeroizing::new(random_bytes::<KEY_SIZE>())
}
