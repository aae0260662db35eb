//! JWE Compact Serialization
//!
//! RFC 7516 with `alg=dir`, `enc=A256GCM`:
//! `b64u(header)..b64u(iv).b64u(ciphertext).b64u(tag)`
//!
//! Only this exact pair is accepted. A header naming anything else is
//! rejected before the key is touched. Signing of the inner payload is left
//! to `jsonwebtoken`.
//!
//! ## Wire compatibility
//! Output is standard compact serialization, readable by any JOSE library
//! configured with the same symmetric keys.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{from_base64url, random_bytes, to_base64url};

/// JWE key management: direct use of a shared symmetric key
pub const ALG_DIR: &str = "dir";
/// JWE content encryption: AES-256-GCM
pub const ENC_A256GCM: &str = "A256GCM";

/// AES-256 key length in bytes
pub const DIRECT_KEY_LEN: usize = 32;
/// GCM nonce length (96 bits)
const IV_LEN: usize = 12;
/// GCM tag length (128 bits)
const TAG_LEN: usize = 16;

/// Protected header, emitted byte-for-byte as written here
const JWE_HEADER: &str = r#"{"alg":"dir","enc":"A256GCM"}"#;

/// JOSE processing errors
///
/// Variants exist for diagnostics only. Callers facing untrusted input
/// should collapse them into one outward signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoseError {
    /// Wrong segment count, bad base64url, bad header JSON, bad lengths
    #[error("Malformed compact serialization")]
    Malformed,

    /// Header names an algorithm other than the one expected
    #[error("Unsupported algorithm")]
    UnsupportedAlgorithm,

    /// JWE authentication tag does not match (tampered or wrong key)
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Cipher refused to encrypt (plaintext too large)
    #[error("Encryption failed")]
    EncryptionFailed,
}

#[derive(Debug, Deserialize)]
struct JweHeader {
    alg: String,
    enc: String,
}

// ============================================================================
// JWE (dir + A256GCM)
// ============================================================================

/// Symmetric content encryption key for `dir` mode
///
/// Zeroized on drop; `Debug` is redacted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DirectKey([u8; DIRECT_KEY_LEN]);

impl DirectKey {
    pub fn new(bytes: [u8; DIRECT_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Accept exactly [`DIRECT_KEY_LEN`] bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; DIRECT_KEY_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    /// Truncate or zero-pad arbitrary bytes to the key length
    ///
    /// Not a key derivation function: the result is only as strong as the
    /// first 32 bytes of the input.
    pub fn truncate_or_pad(bytes: &[u8]) -> Self {
        let mut key = [0u8; DIRECT_KEY_LEN];
        let n = bytes.len().min(DIRECT_KEY_LEN);
        key[..n].copy_from_slice(&bytes[..n]);
        Self(key)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl PartialEq for DirectKey {
    fn eq(&self, other: &Self) -> bool {
        crate::crypto::constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for DirectKey {}

impl std::fmt::Debug for DirectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DirectKey").field(&"[REDACTED]").finish()
    }
}

/// Encrypt `plaintext` as a compact JWE (`dir`, `A256GCM`)
///
/// A fresh random 96-bit IV is drawn for every call.
pub fn encrypt_dir_a256gcm(key: &DirectKey, plaintext: &[u8]) -> Result<String, JoseError> {
    let header_b64 = to_base64url(JWE_HEADER.as_bytes());

    let iv = random_bytes(IV_LEN);
    let sealed = key
        .cipher()
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad: header_b64.as_bytes(),
            },
        )
        .map_err(|_| JoseError::EncryptionFailed)?;

    // aes-gcm appends the tag to the ciphertext
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    Ok(format!(
        "{}..{}.{}.{}",
        header_b64,
        to_base64url(&iv),
        to_base64url(ciphertext),
        to_base64url(tag)
    ))
}

/// Decrypt a compact JWE (`dir`, `A256GCM`) and return the plaintext
pub fn decrypt_dir_a256gcm(key: &DirectKey, jwe: &str) -> Result<Vec<u8>, JoseError> {
    let mut parts = jwe.split('.');
    let (Some(header_b64), Some(encrypted_key), Some(iv_b64), Some(ct_b64), Some(tag_b64), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(JoseError::Malformed);
    };

    let header: JweHeader = decode_json_segment(header_b64)?;
    if header.alg != ALG_DIR || header.enc != ENC_A256GCM {
        return Err(JoseError::UnsupportedAlgorithm);
    }
    // `dir` carries no wrapped key
    if !encrypted_key.is_empty() {
        return Err(JoseError::Malformed);
    }

    let iv = from_base64url(iv_b64).map_err(|_| JoseError::Malformed)?;
    let mut sealed = from_base64url(ct_b64).map_err(|_| JoseError::Malformed)?;
    let tag = from_base64url(tag_b64).map_err(|_| JoseError::Malformed)?;
    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        return Err(JoseError::Malformed);
    }
    sealed.extend_from_slice(&tag);

    key.cipher()
        .decrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: &sealed,
                aad: header_b64.as_bytes(),
            },
        )
        .map_err(|_| JoseError::DecryptionFailed)
}

fn decode_json_segment<T: DeserializeOwned>(segment: &str) -> Result<T, JoseError> {
    let bytes = from_base64url(segment).map_err(|_| JoseError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| JoseError::Malformed)
}
