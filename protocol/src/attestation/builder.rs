//! Attestation construction.
//!
//! One builder for both families. The shape of the output depends only on
//! whether an [`AttestationSecret`] is attached:
//!
//! ```text
//! public:  [d=subject] [p=subject] [e=ref] [payload] [safeguard]   content ""
//! private: [d=pseudonym] [safeguard]                                content enc([p, e, payload])
//! ```

use crate::config::{TAG_EVENT, TAG_NEW_KEY, TAG_PUBLIC_KEY};
use crate::crypto::encryption::encrypt;
use crate::error::{ProtocolError, Result};
use crate::event::{Event, Tag, Tags};
use crate::identity::{canonical_event_id_hex, canonical_key_hex, derive_attestation_identifier};
use crate::migration::validate_key_migration_and_revocation;
use crate::recovery::validate_recovery_keys_setup;

use super::types::{AttestationBundle, AttestationKind, AttestationSecret};

// ---------------------------------------------------------------------------
// Attestation
// ---------------------------------------------------------------------------

/// A third party's statement that it has seen a migration or a setup.
///
/// # Example
///
/// ```
/// use keyward_protocol::attestation::{Attestation, AttestationSecret, validate_attestation};
///
/// let subject = "aa".repeat(32);
/// let att = Attestation::key_migration(&subject, "bb".repeat(32), "cc".repeat(32))
///     .with_secret(AttestationSecret::generate());
/// let event = att.to_event(1_725_402_765).unwrap();
/// assert!(validate_attestation(att.kind, &event).is_ok());
/// assert!(!event.tags.contains_name("p"));
/// ```
#[derive(Debug, Clone)]
pub struct Attestation {
    pub kind: AttestationKind,
    pub bundle: AttestationBundle,
    /// When set, the attestation is private.
    pub secret: Option<AttestationSecret>,
}

impl Attestation {
    pub fn new(kind: AttestationKind, bundle: AttestationBundle) -> Self {
        Self {
            kind,
            bundle,
            secret: None,
        }
    }

    /// Attest that `subject_key` migrated to `new_key` via the migration
    /// event `migration_id`.
    pub fn key_migration(
        subject_key: impl Into<String>,
        migration_id: impl Into<String>,
        new_key: impl Into<String>,
    ) -> Self {
        Self::new(
            AttestationKind::KeyMigration,
            AttestationBundle {
                subject_key: subject_key.into(),
                event_ref: migration_id.into(),
                payload: new_key.into(),
            },
        )
    }

    /// Attest that `subject_key` published the setup `setup_id`, whose full
    /// JSON is `setup_json`.
    pub fn recovery_keys(
        subject_key: impl Into<String>,
        setup_id: impl Into<String>,
        setup_json: impl Into<String>,
    ) -> Self {
        Self::new(
            AttestationKind::RecoveryKeys,
            AttestationBundle {
                subject_key: subject_key.into(),
                event_ref: setup_id.into(),
                payload: setup_json.into(),
            },
        )
    }

    /// Attest a signed setup event as-is.
    pub fn for_recovery_setup(setup: &Event) -> Result<Self> {
        validate_recovery_keys_setup(setup)?;
        if !setup.is_signed() {
            return Err(ProtocolError::input("setup event must be signed before attesting it"));
        }
        Ok(Self::recovery_keys(
            setup.pubkey.clone(),
            setup.id.clone(),
            setup.to_json()?,
        ))
    }

    /// Attest a signed migration event. Revocations have no new key and
    /// can't be attested this way.
    pub fn for_migration(migration: &Event) -> Result<Self> {
        validate_key_migration_and_revocation(migration)?;
        if !migration.is_signed() {
            return Err(ProtocolError::input(
                "migration event must be signed before attesting it",
            ));
        }
        let new_key = migration
            .tags
            .first_value(TAG_NEW_KEY)
            .ok_or_else(|| ProtocolError::input("revocations cannot be attested as migrations"))?;
        Ok(Self::key_migration(
            migration.pubkey.clone(),
            migration.id.clone(),
            new_key,
        ))
    }

    pub fn with_secret(mut self, secret: AttestationSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn is_private(&self) -> bool {
        self.secret.is_some()
    }

    /// Build the unsigned attestation event. The attestor signs it.
    pub fn to_event(&self, created_at: i64) -> Result<Event> {
        let bundle = self.canonical_bundle()?;

        let mut event = Event::new(self.kind.event_kind(), created_at);
        let claims = self.claims(&bundle);

        match &self.secret {
            Some(secret) => {
                let d = derive_attestation_identifier(
                    &bundle.subject_key,
                    secret.key(),
                    secret.salt(),
                )?;
                event.tags.push_unique(Tag::Identifier(d));

                let plaintext = serde_json::to_vec(&claims)
                    .map_err(|e| ProtocolError::Crypto(format!("serializing claims: {e}")))?;
                event.content = encrypt(&plaintext, secret.key(), secret.salt())?;
            }
            None => {
                event
                    .tags
                    .push_unique(Tag::Identifier(bundle.subject_key.clone()));
                for tag in &claims {
                    event.tags.push_unique(tag.clone());
                }
            }
        }
        event.tags.push_unique(Tag::Safeguard(self.kind.safeguard()));

        tracing::debug!(
            kind = %self.kind,
            private = self.is_private(),
            "attestation built"
        );
        Ok(event)
    }

    /// `[p, e, payload]`, in that order.
    fn claims(&self, bundle: &AttestationBundle) -> Tags {
        let payload = match self.kind {
            AttestationKind::KeyMigration => Tag::NewKey(bundle.payload.clone()),
            AttestationKind::RecoveryKeys => Tag::Setup(bundle.payload.clone()),
        };
        let mut tags = Tags::new();
        tags.push_unique(Tag::PublicKey(bundle.subject_key.clone()));
        tags.push_unique(Tag::Event(bundle.event_ref.clone()));
        tags.push_unique(payload);
        tags
    }

    /// The bundle with keys and references checked and lowercased.
    fn canonical_bundle(&self) -> Result<AttestationBundle> {
        let payload = match self.kind {
            AttestationKind::KeyMigration => canonical_key_hex("new key", &self.bundle.payload)?,
            AttestationKind::RecoveryKeys if self.bundle.payload.is_empty() => {
                return Err(ProtocolError::input("setup payload must not be empty"));
            }
            AttestationKind::RecoveryKeys => self.bundle.payload.clone(),
        };
        let subject_key = canonical_key_hex("subject key", &self.bundle.subject_key)?;
        let event_ref = canonical_event_id_hex("attested event reference", &self.bundle.event_ref)?;
        Ok(AttestationBundle {
            subject_key,
            event_ref,
            payload,
        })
    }
}

/// Tag names that only public attestations carry.
pub(crate) fn public_tag_names(kind: AttestationKind) -> [&'static str; 3] {
    [TAG_PUBLIC_KEY, TAG_EVENT, kind.payload_tag()]
}
