//! Pseudonymous attestation identifiers.
//!
//! A private attestation still needs a `d` tag so relays can replace it,
//! but the `d` tag must not reveal whose key is being attested. So:
//!
//! ```text
//! d = hex(sha256(base64_decode(encrypt(subject_key, key, salt))))
//! ```
//!
//! Encryption with a fixed salt is deterministic, so the attestor (and
//! anyone they share `key`/`salt` with) can recompute `d` for a subject and
//! find the attestation. Everyone else sees 32 random-looking bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::encryption::encrypt;
use crate::crypto::hash::sha256_hex;
use crate::error::{ProtocolError, Result};

/// Derive the `d` value for a private attestation about `subject_key`.
///
/// `CryptoError` when `key` or `salt` isn't 32 bytes, or the subject key is
/// empty (there is nothing to encrypt).
///
/// # Example
///
/// ```
/// use keyward_protocol::identity::derive_attestation_identifier;
///
/// let subject = "9166c289b9f905e55f9e3df9f69d7f356b4a22095f894f4715714aa4b56606af";
/// let d = derive_attestation_identifier(subject, &[0xff; 32], &[0xff; 32]).unwrap();
/// assert_eq!(d, "442427cc2ef69f8b15b823327b3cd2e94daac101a8ff89c7d3bdbd35bb64e939");
/// ```
pub fn derive_attestation_identifier(subject_key: &str, key: &[u8], salt: &[u8]) -> Result<String> {
    let sealed = encrypt(subject_key.as_bytes(), key, salt)?;
    let raw = STANDARD
        .decode(sealed)
        .map_err(|e| ProtocolError::Crypto(format!("ciphertext did not round-trip base64: {e}")))?;
    Ok(sha256_hex(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: &str = "9166c289b9f905e55f9e3df9f69d7f356b4a22095f894f4715714aa4b56606af";

    #[test]
    fn test_known_vector() {
        let d = derive_attestation_identifier(SUBJECT, &[0xff; 32], &[0xff; 32]).unwrap();
        assert_eq!(
            d,
            "442427cc2ef69f8b15b823327b3cd2e94daac101a8ff89c7d3bdbd35bb64e939"
        );
    }

    #[test]
    fn test_deterministic() {
        let a = derive_attestation_identifier(SUBJECT, &[1; 32], &[2; 32]).unwrap();
        let b = derive_attestation_identifier(SUBJECT, &[1; 32], &[2; 32]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_differs_from_subject_and_across_secrets() {
        let a = derive_attestation_identifier(SUBJECT, &[1; 32], &[2; 32]).unwrap();
        let b = derive_attestation_identifier(SUBJECT, &[1; 32], &[3; 32]).unwrap();
        let c = derive_attestation_identifier(SUBJECT, &[4; 32], &[2; 32]).unwrap();
        assert_ne!(a, SUBJECT);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_bad_secret_lengths_are_crypto_errors() {
        let err = derive_attestation_identifier(SUBJECT, &[1; 16], &[2; 32]).unwrap_err();
        assert!(matches!(err, ProtocolError::Crypto(_)));
        let err = derive_attestation_identifier(SUBJECT, &[1; 32], &[]).unwrap_err();
        assert!(matches!(err, ProtocolError::Crypto(_)));
    }

    #[test]
    fn test_empty_subject_is_crypto_error() {
        let err = derive_attestation_identifier("", &[1; 32], &[2; 32]).unwrap_err();
        assert!(matches!(err, ProtocolError::Crypto(_)));
    }
}
