//! # Digital Signatures
//!
//! Ed25519 signing and verification over event digests.
//!
//! Everything that gets signed in Keyward is the 32-byte SHA-256 of some
//! canonical serialization: an author signs an event id, a guardian signs
//! the digest of an event with its `sigs` tags stripped. So the functions
//! here take a digest, not an arbitrary message. You can't accidentally
//! sign the JSON itself.
//!
//! ## Wire errors vs. bad signatures
//!
//! [`verify_hex`] separates two outcomes callers care about: inputs that
//! aren't even shaped like a key or signature (an `Err`), and well-formed
//! inputs that simply don't verify (`Ok(false)`).

use thiserror::Error;

use super::keys::{KeyError, Keypair, PublicKey, Signature};

/// Errors during signature operations on hex-encoded inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("invalid secret key")]
    InvalidSecretKey,
}

impl From<KeyError> for SignatureError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidSecretKey => Self::InvalidSecretKey,
            KeyError::InvalidPublicKey => Self::InvalidPublicKey,
            KeyError::InvalidSignature => Self::InvalidSignature,
        }
    }
}

/// Sign a 32-byte digest.
///
/// # Example
///
/// ```
/// use keyward_protocol::crypto::{Keypair, sha256_array, sign_digest, verify_digest};
///
/// let keypair = Keypair::generate();
/// let digest = sha256_array(b"[0,\"...\",0,50,[],\"\"]");
/// let signature = sign_digest(&keypair, &digest);
///
/// assert!(verify_digest(&keypair.public_key(), &digest, &signature));
/// ```
pub fn sign_digest(keypair: &Keypair, digest: &[u8; 32]) -> Signature {
    keypair.sign(digest)
}

/// Verify a signature over a 32-byte digest.
pub fn verify_digest(public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool {
    public_key.verify(digest, signature)
}

/// Sign a digest with a hex-encoded secret key and return hex.
///
/// The "a guardian pasted their key into a prompt" variant. The decoded
/// secret never outlives this call.
pub fn sign_digest_hex(secret_key_hex: &str, digest: &[u8; 32]) -> Result<String, SignatureError> {
    let keypair = Keypair::from_hex(secret_key_hex)?;
    Ok(sign_digest(&keypair, digest).to_hex())
}

/// Verify a hex-encoded signature against a hex-encoded public key.
///
/// `Err` when either input is malformed (bad hex, wrong length, not a curve
/// point). `Ok(false)` when both are well-formed but the signature doesn't
/// check out.
pub fn verify_hex(
    public_key_hex: &str,
    digest: &[u8; 32],
    signature_hex: &str,
) -> Result<bool, SignatureError> {
    let public_key = PublicKey::from_hex(public_key_hex)?;
    let signature = Signature::from_hex(signature_hex)?;
    Ok(verify_digest(&public_key, digest, &signature))
}
