//! Value types shared by attestation building, validation and disclosure.

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{
    EventKind, Safeguard, ENCRYPTION_KEY_LENGTH, ENCRYPTION_SALT_LENGTH, TAG_NEW_KEY, TAG_SETUP,
};
use crate::error::{ProtocolError, Result};
use crate::event::Event;

// ---------------------------------------------------------------------------
// AttestationKind
// ---------------------------------------------------------------------------

/// Which attestation family: what is being vouched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttestationKind {
    /// "I have seen this key migrate to that one." Kind 30050.
    KeyMigration,
    /// "I have seen this recovery setup." Kind 30051.
    RecoveryKeys,
}

impl AttestationKind {
    pub const ALL: [AttestationKind; 2] =
        [AttestationKind::KeyMigration, AttestationKind::RecoveryKeys];

    pub const fn event_kind(self) -> EventKind {
        match self {
            Self::KeyMigration => EventKind::KeyMigrationAttestation,
            Self::RecoveryKeys => EventKind::RecoveryKeysAttestation,
        }
    }

    pub const fn safeguard(self) -> Safeguard {
        match self {
            Self::KeyMigration => Safeguard::KeyMigrationAttestation,
            Self::RecoveryKeys => Safeguard::RecoveryKeysAttestation,
        }
    }

    /// Name of the tag carrying the attested payload: the new key for
    /// migrations, the full setup event JSON for recovery keys.
    pub const fn payload_tag(self) -> &'static str {
        match self {
            Self::KeyMigration => TAG_NEW_KEY,
            Self::RecoveryKeys => TAG_SETUP,
        }
    }

    /// Classify an event by its kind.
    pub fn of(event: &Event) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.event_kind().as_u16() == event.kind)
    }
}

impl fmt::Display for AttestationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyMigration => write!(f, "key-migration"),
            Self::RecoveryKeys => write!(f, "recovery-keys"),
        }
    }
}

// ---------------------------------------------------------------------------
// AttestationSecret
// ---------------------------------------------------------------------------

/// Symmetric key and salt for private attestations.
///
/// The same pair derives the `d` pseudonym and encrypts the content, so
/// whoever holds it can both find and read the attestation. Zeroized on
/// drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AttestationSecret {
    key: [u8; ENCRYPTION_KEY_LENGTH],
    salt: [u8; ENCRYPTION_SALT_LENGTH],
}

impl AttestationSecret {
    /// `Crypto` error unless both `key` and `salt` are 32 bytes.
    pub fn new(key: &[u8], salt: &[u8]) -> Result<Self> {
        let key: [u8; ENCRYPTION_KEY_LENGTH] = key.try_into().map_err(|_| {
            ProtocolError::Crypto(format!(
                "attestation key must be {ENCRYPTION_KEY_LENGTH} bytes, got {}",
                key.len()
            ))
        })?;
        let salt: [u8; ENCRYPTION_SALT_LENGTH] = salt.try_into().map_err(|_| {
            ProtocolError::Crypto(format!(
                "attestation salt must be {ENCRYPTION_SALT_LENGTH} bytes, got {}",
                salt.len()
            ))
        })?;
        Ok(Self { key, salt })
    }

    pub fn from_hex(key_hex: &str, salt_hex: &str) -> Result<Self> {
        let key = zeroize::Zeroizing::new(
            hex::decode(key_hex).map_err(|_| ProtocolError::input("attestation key is not hex"))?,
        );
        let salt =
            hex::decode(salt_hex).map_err(|_| ProtocolError::input("attestation salt is not hex"))?;
        Self::new(&key, &salt)
    }

    /// Fresh random key and salt from the OS RNG.
    pub fn generate() -> Self {
        let mut secret = Self {
            key: [0u8; ENCRYPTION_KEY_LENGTH],
            salt: [0u8; ENCRYPTION_SALT_LENGTH],
        };
        OsRng.fill_bytes(&mut secret.key);
        OsRng.fill_bytes(&mut secret.salt);
        secret
    }

    pub fn key(&self) -> &[u8; ENCRYPTION_KEY_LENGTH] {
        &self.key
    }

    pub fn salt(&self) -> &[u8; ENCRYPTION_SALT_LENGTH] {
        &self.salt
    }
}

impl fmt::Debug for AttestationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AttestationSecret(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// AttestationBundle / Disclosure
// ---------------------------------------------------------------------------

/// What an attestation says, once read out of public tags or decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationBundle {
    /// The key the attestation is about (`p`).
    pub subject_key: String,
    /// The migration or setup event being attested (`e`).
    pub event_ref: String,
    /// New key hex, or setup event JSON, depending on the kind.
    pub payload: String,
}

/// Whether an attestation's claims are readable by everyone.
///
/// Exactly one holds for any attestation event: empty content means the
/// claims sit in public tags, non-empty content means they're encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disclosure {
    Public,
    Private,
}

impl Disclosure {
    pub fn of(event: &Event) -> Self {
        if event.content.is_empty() {
            Self::Public
        } else {
            Self::Private
        }
    }
}

impl fmt::Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_catalog() {
        assert_eq!(AttestationKind::KeyMigration.event_kind().as_u16(), 30050);
        assert_eq!(AttestationKind::RecoveryKeys.event_kind().as_u16(), 30051);
        assert_eq!(
            AttestationKind::KeyMigration.safeguard().as_str(),
            "key-migration-attestation"
        );
        assert_eq!(
            AttestationKind::RecoveryKeys.safeguard().as_str(),
            "recovery-keys-attestation"
        );
        assert_eq!(AttestationKind::KeyMigration.payload_tag(), "new-key");
        assert_eq!(AttestationKind::RecoveryKeys.payload_tag(), "setup");
    }

    #[test]
    fn test_kind_of_event() {
        let evt = Event::new(EventKind::RecoveryKeysAttestation, 0);
        assert_eq!(AttestationKind::of(&evt), Some(AttestationKind::RecoveryKeys));
        let evt = Event::new(EventKind::RecoveryKeysSetup, 0);
        assert_eq!(AttestationKind::of(&evt), None);
    }

    #[test]
    fn test_secret_lengths() {
        assert!(AttestationSecret::new(&[1; 32], &[2; 32]).is_ok());
        assert!(matches!(
            AttestationSecret::new(&[1; 31], &[2; 32]),
            Err(ProtocolError::Crypto(_))
        ));
        assert!(matches!(
            AttestationSecret::new(&[1; 32], &[]),
            Err(ProtocolError::Crypto(_))
        ));
        assert!(matches!(
            AttestationSecret::from_hex("zz", &"00".repeat(32)),
            Err(ProtocolError::Input(_))
        ));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = AttestationSecret::new(&[0xAB; 32], &[0xCD; 32]).unwrap();
        let shown = format!("{:?}", secret);
        assert!(!shown.to_lowercase().contains("ab"));
        assert!(shown.contains("redacted"));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = AttestationSecret::generate();
        let b = AttestationSecret::generate();
        assert_ne!(a.key(), b.key());
        assert_ne!(a.salt(), b.salt());
    }

    #[test]
    fn test_disclosure_follows_content() {
        let mut evt = Event::new(EventKind::KeyMigrationAttestation, 0);
        assert_eq!(Disclosure::of(&evt), Disclosure::Public);
        evt.content = "AgAA".into();
        assert_eq!(Disclosure::of(&evt), Disclosure::Private);
    }
}
