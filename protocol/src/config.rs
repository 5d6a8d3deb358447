//! # Protocol Catalog & Constants
//!
//! Every kind number, safeguard string and tag name in Keyward lives here.
//! If you're hardcoding `"key-migration"` somewhere else, you're doing it
//! wrong and you owe the team coffee.
//!
//! These values are the wire vocabulary. Relays, clients and attestors all
//! have to agree on them byte for byte, so changing any of them after
//! release is somewhere between "breaking" and "career-ending".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string of the protocol rule set implemented here.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Event Kinds
// ---------------------------------------------------------------------------

/// Regular event: a key migrates to a successor, or revokes itself.
pub const KIND_KEY_MIGRATION_AND_REVOCATION: u16 = 50;

/// Regular event: registers guardian keys and a threshold.
pub const KIND_RECOVERY_KEYS_SETUP: u16 = 51;

/// Parameterized replaceable event (author, kind, `d`): attests a migration.
pub const KIND_KEY_MIGRATION_ATTESTATION: u16 = 30050;

/// Parameterized replaceable event (author, kind, `d`): attests a setup.
pub const KIND_RECOVERY_KEYS_ATTESTATION: u16 = 30051;

/// Kinds in `[30000, 40000)` are parameterized replaceable: relays keep only
/// the newest event per (author, kind, `d` value).
pub const PARAMETERIZED_REPLACEABLE_RANGE: std::ops::Range<u16> = 30000..40000;

// ---------------------------------------------------------------------------
// Tag Names
// ---------------------------------------------------------------------------

/// Identifier tag. Keys a replaceable event.
pub const TAG_IDENTIFIER: &str = "d";

/// Public-key reference (subject, guardian).
pub const TAG_PUBLIC_KEY: &str = "p";

/// Event reference.
pub const TAG_EVENT: &str = "e";

/// The key an identity migrates to.
pub const TAG_NEW_KEY: &str = "new-key";

/// Advisory successor on a plain revocation.
pub const TAG_SUCCESSOR_KEY: &str = "successor-key";

/// Guardian threshold, base-10.
pub const TAG_THRESHOLD: &str = "threshold";

/// Full JSON of a recovery-keys-setup event, embedded in an attestation.
pub const TAG_SETUP: &str = "setup";

/// Co-signature bundle.
pub const TAG_CO_SIGNATURES: &str = "sigs";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 for author signatures and guardian co-signatures.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Public key length in bytes. Hex-encoded on the wire (64 chars).
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Hex-encoded on the wire (128 chars).
pub const SIGNATURE_LENGTH: usize = 64;

/// Event ids are hex SHA-256 digests of the canonical serialization.
pub const EVENT_ID_LENGTH: usize = 32;

/// Salted symmetric scheme: ChaCha20 + HMAC-SHA256, keys via HKDF.
pub const SYMMETRIC_ALGORITHM: &str = "ChaCha20-HMAC-SHA256";

/// Version byte prefixed to every encrypted payload.
pub const ENCRYPTION_VERSION: u8 = 2;

/// Symmetric key length in bytes.
pub const ENCRYPTION_KEY_LENGTH: usize = 32;

/// Salt length in bytes. The salt doubles as the HKDF info and is carried
/// in the clear inside the payload.
pub const ENCRYPTION_SALT_LENGTH: usize = 32;

/// HMAC-SHA256 tag length.
pub const ENCRYPTION_MAC_LENGTH: usize = 32;

/// Smallest plaintext we agree to encrypt.
pub const MIN_PLAINTEXT_LENGTH: usize = 1;

/// Largest plaintext we agree to encrypt. The length prefix is a `u16`.
pub const MAX_PLAINTEXT_LENGTH: usize = 65535;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// The four event kinds this protocol defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    KeyMigrationAndRevocation,
    RecoveryKeysSetup,
    KeyMigrationAttestation,
    RecoveryKeysAttestation,
}

impl EventKind {
    /// All kinds, in catalog order.
    pub const ALL: [EventKind; 4] = [
        EventKind::KeyMigrationAndRevocation,
        EventKind::RecoveryKeysSetup,
        EventKind::KeyMigrationAttestation,
        EventKind::RecoveryKeysAttestation,
    ];

    /// The numeric kind as it appears on the wire.
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::KeyMigrationAndRevocation => KIND_KEY_MIGRATION_AND_REVOCATION,
            Self::RecoveryKeysSetup => KIND_RECOVERY_KEYS_SETUP,
            Self::KeyMigrationAttestation => KIND_KEY_MIGRATION_ATTESTATION,
            Self::RecoveryKeysAttestation => KIND_RECOVERY_KEYS_ATTESTATION,
        }
    }

    /// Reverse lookup. `None` for any kind outside the catalog.
    pub fn from_u16(kind: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_u16() == kind)
    }

    /// Whether relays treat this kind as parameterized replaceable.
    pub fn is_replaceable(self) -> bool {
        PARAMETERIZED_REPLACEABLE_RANGE.contains(&self.as_u16())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KeyMigrationAndRevocation => "KeyMigrationAndRevocation",
            Self::RecoveryKeysSetup => "RecoveryKeysSetup",
            Self::KeyMigrationAttestation => "KeyMigrationAttestation",
            Self::RecoveryKeysAttestation => "RecoveryKeysAttestation",
        };
        write!(f, "{}({})", name, self.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Safeguard
// ---------------------------------------------------------------------------

/// Single-element discriminant tags. Each event carries exactly one, with
/// no value, so a misrouted or mistyped event fails loudly instead of being
/// half-interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Safeguard {
    KeyMigration,
    KeyRevocation,
    KeyMigrationAttestation,
    RecoveryKeysSetup,
    RecoveryKeysAttestation,
}

impl Safeguard {
    pub const ALL: [Safeguard; 5] = [
        Safeguard::KeyMigration,
        Safeguard::KeyRevocation,
        Safeguard::KeyMigrationAttestation,
        Safeguard::RecoveryKeysSetup,
        Safeguard::RecoveryKeysAttestation,
    ];

    /// The tag name on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyMigration => "key-migration",
            Self::KeyRevocation => "key-revocation",
            Self::KeyMigrationAttestation => "key-migration-attestation",
            Self::RecoveryKeysSetup => "recovery-keys-setup",
            Self::RecoveryKeysAttestation => "recovery-keys-attestation",
        }
    }
}

impl fmt::Display for Safeguard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Safeguard {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|g| g.as_str() == s).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_numbers() {
        assert_eq!(EventKind::KeyMigrationAndRevocation.as_u16(), 50);
        assert_eq!(EventKind::RecoveryKeysSetup.as_u16(), 51);
        assert_eq!(EventKind::KeyMigrationAttestation.as_u16(), 30050);
        assert_eq!(EventKind::RecoveryKeysAttestation.as_u16(), 30051);
    }

    #[test]
    fn test_kind_lookup_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_u16(kind.as_u16()), Some(kind));
        }
        assert_eq!(EventKind::from_u16(1), None);
        assert_eq!(EventKind::from_u16(52), None);
    }

    #[test]
    fn test_only_attestations_are_replaceable() {
        assert!(!EventKind::KeyMigrationAndRevocation.is_replaceable());
        assert!(!EventKind::RecoveryKeysSetup.is_replaceable());
        assert!(EventKind::KeyMigrationAttestation.is_replaceable());
        assert!(EventKind::RecoveryKeysAttestation.is_replaceable());
    }

    #[test]
    fn test_safeguard_strings() {
        assert_eq!(Safeguard::KeyMigration.as_str(), "key-migration");
        assert_eq!(Safeguard::KeyRevocation.as_str(), "key-revocation");
        assert_eq!(
            Safeguard::KeyMigrationAttestation.as_str(),
            "key-migration-attestation"
        );
        assert_eq!(Safeguard::RecoveryKeysSetup.as_str(), "recovery-keys-setup");
        assert_eq!(
            Safeguard::RecoveryKeysAttestation.as_str(),
            "recovery-keys-attestation"
        );
    }

    #[test]
    fn test_safeguard_parse() {
        for guard in Safeguard::ALL {
            assert_eq!(guard.as_str().parse::<Safeguard>(), Ok(guard));
        }
        assert!("key-migrations".parse::<Safeguard>().is_err());
        assert!("".parse::<Safeguard>().is_err());
    }

    #[test]
    fn test_safeguards_never_collide_with_tag_names() {
        // A safeguard that doubled as a payload tag would make the
        // "exactly one, no value" rule ambiguous.
        let tags = [
            TAG_IDENTIFIER,
            TAG_PUBLIC_KEY,
            TAG_EVENT,
            TAG_NEW_KEY,
            TAG_SUCCESSOR_KEY,
            TAG_THRESHOLD,
            TAG_SETUP,
            TAG_CO_SIGNATURES,
        ];
        for guard in Safeguard::ALL {
            assert!(!tags.contains(&guard.as_str()));
        }
    }

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(PUBLIC_KEY_LENGTH, 32);
        assert_eq!(SECRET_KEY_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 64);
        assert_eq!(EVENT_ID_LENGTH, 32);
        assert_eq!(ENCRYPTION_KEY_LENGTH, 32);
        assert_eq!(ENCRYPTION_SALT_LENGTH, 32);
        assert_eq!(MAX_PLAINTEXT_LENGTH, u16::MAX as usize);
    }
}
