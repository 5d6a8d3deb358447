//! # Identity Module
//!
//! An identity in Keyward is nothing more than a 32-byte Ed25519 public key,
//! written as 64 lowercase hex characters. Subjects, guardians, successor
//! keys and attestors are all identities.
//!
//! This module holds the two things that are about identities rather than
//! about any one event family:
//!
//! 1. **Input checks**: builders refuse anything that isn't 32 bytes of hex
//!    and write what they accept in lowercase. Validators, on the other hand, treat tag
//!    values as opaque. They judge shape, not content.
//! 2. **Pseudonyms**: deterministic, unlinkable `d` identifiers for private
//!    attestations.

pub mod pseudonym;

pub use pseudonym::derive_attestation_identifier;

use crate::config::{EVENT_ID_LENGTH, PUBLIC_KEY_LENGTH};
use crate::error::{ProtocolError, Result};

/// Require `value` to be exactly `len` bytes of hex, returned lowercase.
fn canonical_hex(field: &str, value: &str, len: usize) -> Result<String> {
    let bytes = hex::decode(value)
        .map_err(|_| ProtocolError::input(format!("{field} is not valid hex")))?;
    if bytes.len() != len {
        return Err(ProtocolError::input(format!(
            "{field} must be {len} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(hex::encode(bytes))
}

/// Builder-side check for a public key (64 hex chars). Events carry the
/// lowercase form, whatever case the caller used.
pub fn canonical_key_hex(field: &str, value: &str) -> Result<String> {
    canonical_hex(field, value, PUBLIC_KEY_LENGTH)
}

/// Builder-side check for an event id (64 hex chars), lowercased.
pub fn canonical_event_id_hex(field: &str, value: &str) -> Result<String> {
    canonical_hex(field, value, EVENT_ID_LENGTH)
}
