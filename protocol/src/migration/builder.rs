//! Migration and revocation construction.
//!
//! The builder produces an **unsigned** kind-50 event with `pubkey` already
//! set to the subject key, ready for [`Event::sign`] by the subject or for
//! guardian co-signing via [`crate::cosign`].

use serde::{Deserialize, Serialize};

use crate::config::{EventKind, Safeguard, TAG_EVENT, TAG_NEW_KEY, TAG_SUCCESSOR_KEY};
use crate::error::{ProtocolError, Result};
use crate::event::{Event, Tag};
use crate::identity::{canonical_event_id_hex, canonical_key_hex};

use super::verification::validate_key_migration_and_revocation;

// ---------------------------------------------------------------------------
// KeyMigrationAndRevocation
// ---------------------------------------------------------------------------

/// A declaration that `subject_key` is retired.
///
/// With a `new_key` it's a **migration**: the subject moves to the new key,
/// and guardians registered in the referenced recovery setup vouch for it.
/// Without one it's a **revocation**, optionally naming a successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMigrationAndRevocation {
    /// The key being retired. Becomes the event author.
    pub subject_key: String,

    /// Present for migrations, absent for revocations.
    pub new_key: Option<String>,

    /// Id of the recovery-keys-setup event whose guardians approve the
    /// migration. Ignored for revocations.
    pub recovery_setup_ref: Option<String>,

    /// Optional pointer to a replacement key, revocations only.
    pub successor_key: Option<String>,

    /// Free-form, becomes the event content.
    pub comment: String,
}

impl KeyMigrationAndRevocation {
    pub fn new(subject_key: impl Into<String>) -> Self {
        Self {
            subject_key: subject_key.into(),
            new_key: None,
            recovery_setup_ref: None,
            successor_key: None,
            comment: String::new(),
        }
    }

    /// A migration from `subject_key` to `new_key`, approved under the
    /// setup identified by `recovery_setup_ref`.
    pub fn migration(
        subject_key: impl Into<String>,
        new_key: impl Into<String>,
        recovery_setup_ref: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            new_key: Some(new_key.into()),
            recovery_setup_ref: Some(recovery_setup_ref.into()),
            comment: comment.into(),
            ..Self::new(subject_key)
        }
    }

    /// A plain revocation of `subject_key`.
    pub fn revocation(subject_key: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..Self::new(subject_key)
        }
    }

    pub fn with_successor_key(mut self, successor_key: impl Into<String>) -> Self {
        self.successor_key = Some(successor_key.into());
        self
    }

    pub fn is_migration(&self) -> bool {
        self.new_key.is_some()
    }

    /// Build the unsigned kind-50 event.
    ///
    /// Migration tags: `new-key`, `e`, `key-migration`.
    /// Revocation tags: `successor-key` (if any), `key-revocation`.
    pub fn to_event(&self, created_at: i64) -> Result<Event> {
        let subject_key = canonical_key_hex("subject key", &self.subject_key)?;

        let mut event = Event::new(EventKind::KeyMigrationAndRevocation, created_at);
        event.pubkey = subject_key.clone();
        event.content = self.comment.clone();

        match &self.new_key {
            Some(new_key) => {
                let new_key = canonical_key_hex("new key", new_key)?;
                if new_key == subject_key {
                    return Err(ProtocolError::input("new key must differ from subject key"));
                }
                if self.successor_key.is_some() {
                    return Err(ProtocolError::input(
                        "successor key only applies to revocations",
                    ));
                }
                let setup_ref = self.recovery_setup_ref.as_deref().ok_or_else(|| {
                    ProtocolError::input("migration requires a recovery setup reference")
                })?;
                let setup_ref = canonical_event_id_hex("recovery setup reference", setup_ref)?;

                event.tags.push_unique(Tag::NewKey(new_key));
                event.tags.push_unique(Tag::Event(setup_ref));
                event.tags.push_unique(Tag::Safeguard(Safeguard::KeyMigration));
            }
            None => {
                if let Some(successor) = &self.successor_key {
                    let successor = canonical_key_hex("successor key", successor)?;
                    event.tags.push_unique(Tag::SuccessorKey(successor));
                }
                if self.recovery_setup_ref.is_some() {
                    tracing::debug!("recovery setup reference ignored for revocation");
                }
                event
                    .tags
                    .push_unique(Tag::Safeguard(Safeguard::KeyRevocation));
            }
        }

        tracing::debug!(
            migration = self.is_migration(),
            created_at,
            "key migration event built"
        );
        Ok(event)
    }

    /// Validate, then read the declaration back out of an event.
    pub fn from_event(event: &Event) -> Result<Self> {
        validate_key_migration_and_revocation(event)?;
        let new_key = event.tags.first_value(TAG_NEW_KEY).map(str::to_string);
        let recovery_setup_ref = match new_key {
            Some(_) => event.tags.first_value(TAG_EVENT).map(str::to_string),
            None => None,
        };
        Ok(Self {
            subject_key: event.pubkey.clone(),
            new_key,
            recovery_setup_ref,
            successor_key: event.tags.first_value(TAG_SUCCESSOR_KEY).map(str::to_string),
            comment: event.content.clone(),
        })
    }
}
