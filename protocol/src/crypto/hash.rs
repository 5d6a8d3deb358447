//! # Hashing Utilities
//!
//! SHA-256, and only SHA-256. Event ids, co-signature digests and the
//! pseudonymous attestation identifiers are all SHA-256 over some byte
//! string, because that is what every relay and client already speaks.
//!
//! If you find yourself reaching for a second hash function here, ask
//! whether the other side of the wire will agree with you. It won't.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest as a `Vec<u8>`, for call sites that feed the
/// result straight into another `&[u8]` API.
///
/// # Example
///
/// ```
/// use keyward_protocol::crypto::sha256;
///
/// let hash = sha256(b"keyward");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
///
/// Same as `sha256()` without the heap allocation. This is what signing
/// uses: the 32-byte digest is the message handed to Ed25519.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256, lowercase hex. 64 characters, the shape of every event id.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty_vector() {
        // FIPS 180-2 empty-string digest.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_abc_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_vec_and_array_agree() {
        let data = b"guardians at the gate";
        assert_eq!(sha256(data), sha256_array(data).to_vec());
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(sha256_array(b"key-migration"), sha256_array(b"key-revocation"));
    }
}
