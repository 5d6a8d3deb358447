//! # Salted Symmetric Encryption
//!
//! Authenticated encryption for private attestations. Given a 32-byte key
//! and a 32-byte salt, the output is fully deterministic, which is the
//! whole point: the same (subject, key, salt) always yields the same
//! ciphertext, so the pseudonymous `d` identifier derived from it is stable
//! and a replaceable attestation can be updated in place.
//!
//! ## Construction
//!
//! The byte layout is the NIP-44 version 2 payload, with the caller's salt
//! in the nonce position:
//!
//! ```text
//! (chacha_key[32], chacha_nonce[12], hmac_key[32]) = HKDF-Expand(key, info = salt, 76)
//! padded     = u16_be(len) || plaintext || zeros
//! ciphertext = ChaCha20(chacha_key, chacha_nonce, counter = 0) ^ padded
//! mac        = HMAC-SHA256(hmac_key, salt || ciphertext)
//! payload    = base64(0x02 || salt || ciphertext || mac)
//! ```
//!
//! ## Deterministic is not the same as nonce-free
//!
//! Reusing a (key, salt) pair for two *different* plaintexts leaks their
//! XOR, same as any stream cipher. Attestors pick a fresh salt per subject
//! and reuse it only to re-encrypt the same bundle.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{
    ENCRYPTION_KEY_LENGTH, ENCRYPTION_MAC_LENGTH, ENCRYPTION_SALT_LENGTH, ENCRYPTION_VERSION,
    MAX_PLAINTEXT_LENGTH, MIN_PLAINTEXT_LENGTH,
};

type HmacSha256 = Hmac<Sha256>;

/// ChaCha20 key, ChaCha20 nonce, HMAC key.
const MESSAGE_KEYS_LENGTH: usize = 32 + 12 + 32;

/// Version byte + salt + smallest padded block + length prefix + mac.
const MIN_PAYLOAD_LENGTH: usize = 1 + ENCRYPTION_SALT_LENGTH + 2 + 32 + ENCRYPTION_MAC_LENGTH;

/// Errors that can occur during encryption/decryption.
///
/// Decryption failures are deliberately lumped together. "Wrong key" and
/// "tampered ciphertext" are none of an attacker's business.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("invalid key length: expected {ENCRYPTION_KEY_LENGTH} bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("invalid salt length: expected {ENCRYPTION_SALT_LENGTH} bytes, got {0}")]
    InvalidSaltLength(usize),

    #[error(
        "invalid plaintext length {0}: must be between {MIN_PLAINTEXT_LENGTH} and {MAX_PLAINTEXT_LENGTH} bytes"
    )]
    InvalidPlaintextLength(usize),

    #[error("encryption failed")]
    EncryptFailed,

    #[error("payload is not valid base64 or is truncated")]
    MalformedPayload,

    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u8),

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,
}

/// Derived per-message keys. Zeroized when dropped.
struct MessageKeys {
    okm: Zeroizing<[u8; MESSAGE_KEYS_LENGTH]>,
}

impl MessageKeys {
    fn derive(key: &[u8], salt: &[u8]) -> Result<Self, EncryptionError> {
        check_lengths(key, salt)?;
        // The key is used directly as the PRK; there is no extract step.
        let hkdf = Hkdf::<Sha256>::from_prk(key)
            .map_err(|_| EncryptionError::InvalidKeyLength(key.len()))?;
        let mut okm = Zeroizing::new([0u8; MESSAGE_KEYS_LENGTH]);
        hkdf.expand(salt, &mut okm[..])
            .map_err(|_| EncryptionError::InvalidKeyLength(key.len()))?;
        Ok(Self { okm })
    }

    fn cipher(&self) -> Result<ChaCha20, EncryptionError> {
        ChaCha20::new_from_slices(&self.okm[0..32], &self.okm[32..44])
            .map_err(|_| EncryptionError::EncryptFailed)
    }

    fn mac(&self, salt: &[u8], ciphertext: &[u8]) -> Result<HmacSha256, EncryptionError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.okm[44..76])
            .map_err(|_| EncryptionError::EncryptFailed)?;
        mac.update(salt);
        mac.update(ciphertext);
        Ok(mac)
    }
}

fn check_lengths(key: &[u8], salt: &[u8]) -> Result<(), EncryptionError> {
    if key.len() != ENCRYPTION_KEY_LENGTH {
        return Err(EncryptionError::InvalidKeyLength(key.len()));
    }
    if salt.len() != ENCRYPTION_SALT_LENGTH {
        return Err(EncryptionError::InvalidSaltLength(salt.len()));
    }
    Ok(())
}

/// Padded size of a plaintext of `len` bytes, excluding the length prefix.
///
/// Small messages round up to 32 bytes. Larger ones round up to a multiple
/// of 1/8th of the next power of two, with a floor of 32, so the length
/// leaks only coarsely.
pub fn padded_length(len: usize) -> usize {
    if len <= 32 {
        return 32;
    }
    let next_power = 1usize << (usize::BITS - (len - 1).leading_zeros());
    let chunk = if next_power <= 256 { 32 } else { next_power / 8 };
    chunk * ((len - 1) / chunk + 1)
}

fn pad(plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>, EncryptionError> {
    let len = plaintext.len();
    if !(MIN_PLAINTEXT_LENGTH..=MAX_PLAINTEXT_LENGTH).contains(&len) {
        return Err(EncryptionError::InvalidPlaintextLength(len));
    }
    let mut padded = Zeroizing::new(Vec::with_capacity(2 + padded_length(len)));
    padded.extend_from_slice(&(len as u16).to_be_bytes());
    padded.extend_from_slice(plaintext);
    padded.resize(2 + padded_length(len), 0);
    Ok(padded)
}

fn unpad(padded: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if padded.len() < 2 {
        return Err(EncryptionError::DecryptFailed);
    }
    let len = u16::from_be_bytes([padded[0], padded[1]]) as usize;
    if len < MIN_PLAINTEXT_LENGTH || padded.len() != 2 + padded_length(len) {
        return Err(EncryptionError::DecryptFailed);
    }
    Ok(padded[2..2 + len].to_vec())
}

/// Encrypt `plaintext` under `key` and `salt`, returning the base64 payload.
///
/// # Example
///
/// ```
/// use keyward_protocol::crypto::encryption::{encrypt, decrypt};
///
/// let key = [0x42u8; 32]; // In real code, use a properly random key!
/// let salt = [0x07u8; 32];
///
/// let sealed = encrypt(b"guardian list", &key, &salt).unwrap();
/// assert_eq!(sealed, encrypt(b"guardian list", &key, &salt).unwrap());
/// assert_eq!(decrypt(&sealed, &key, &salt).unwrap(), b"guardian list");
/// ```
pub fn encrypt(plaintext: &[u8], key: &[u8], salt: &[u8]) -> Result<String, EncryptionError> {
    let keys = MessageKeys::derive(key, salt)?;
    let padded = pad(plaintext)?;

    let mut ciphertext = padded.to_vec();
    keys.cipher()?.apply_keystream(&mut ciphertext);
    let tag = keys.mac(salt, &ciphertext)?.finalize().into_bytes();

    let mut out = Vec::with_capacity(1 + salt.len() + ciphertext.len() + tag.len());
    out.push(ENCRYPTION_VERSION);
    out.extend_from_slice(salt);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&tag);
    Ok(STANDARD.encode(out))
}

/// Decrypt a payload produced by [`encrypt`] with the same key and salt.
///
/// Checks, in order: key/salt sizes, base64 and minimum length, version
/// byte, that the embedded salt is the one supplied, the MAC (constant
/// time), then the padding.
pub fn decrypt(payload: &str, key: &[u8], salt: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let keys = MessageKeys::derive(key, salt)?;

    let raw = STANDARD
        .decode(payload)
        .map_err(|_| EncryptionError::MalformedPayload)?;
    if raw.len() < MIN_PAYLOAD_LENGTH {
        return Err(EncryptionError::MalformedPayload);
    }
    if raw[0] != ENCRYPTION_VERSION {
        return Err(EncryptionError::UnsupportedVersion(raw[0]));
    }

    let embedded_salt = &raw[1..1 + ENCRYPTION_SALT_LENGTH];
    let mac_start = raw.len() - ENCRYPTION_MAC_LENGTH;
    let ciphertext = &raw[1 + ENCRYPTION_SALT_LENGTH..mac_start];
    let tag = &raw[mac_start..];

    if embedded_salt != salt {
        return Err(EncryptionError::DecryptFailed);
    }
    keys.mac(salt, ciphertext)?
        .verify_slice(tag)
        .map_err(|_| EncryptionError::DecryptFailed)?;

    let mut padded = Zeroizing::new(ciphertext.to_vec());
    keys.cipher()?.apply_keystream(&mut padded);
    unpad(&padded)
}
