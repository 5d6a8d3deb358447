//! Recovery-keys setup: who the guardians are and how many must agree.
//!
//! A setup event (kind 51) lists guardian keys as `p` tags, carries one
//! `threshold` tag and the `recovery-keys-setup` safeguard. A later
//! migration references the setup by id, and guardians co-sign the
//! migration.
//!
//! Note what validation does *not* check: that `threshold` is at most the
//! number of guardians. A setup asking for 5 of 3 is structurally fine and
//! simply can never reach quorum (see [`super::quorum`]).

use serde::{Deserialize, Serialize};

use crate::config::{EventKind, Safeguard, TAG_PUBLIC_KEY, TAG_THRESHOLD};
use crate::error::{ProtocolError, Result, ValidationError};
use crate::event::{Event, Tag};
use crate::identity::canonical_key_hex;
use crate::validation::{check_kind, check_safeguard};

/// Largest threshold the `threshold` tag can carry.
pub const MAX_THRESHOLD: u64 = i64::MAX as u64;

/// A guardian set and the number of guardians required to approve.
///
/// # Example
///
/// ```
/// use keyward_protocol::recovery::{RecoveryKeysSetup, validate_recovery_keys_setup};
///
/// let setup = RecoveryKeysSetup::new(["aa".repeat(32), "bb".repeat(32)], 2, "my guardians");
/// let event = setup.to_event(1_725_402_764).unwrap();
/// assert!(validate_recovery_keys_setup(&event).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryKeysSetup {
    /// Guardian public keys, in the order they'll appear as `p` tags.
    pub guardian_keys: Vec<String>,
    /// How many guardians must co-sign. Strictly positive, at most
    /// [`MAX_THRESHOLD`].
    pub threshold: u64,
    /// Free-form, becomes the event content.
    pub comment: String,
}

impl RecoveryKeysSetup {
    pub fn new<I, S>(guardian_keys: I, threshold: u64, comment: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            guardian_keys: guardian_keys.into_iter().map(Into::into).collect(),
            threshold,
            comment: comment.into(),
        }
    }

    /// Serialize into an unsigned kind-51 event.
    ///
    /// Tags: one `p` per guardian (duplicates collapse), `threshold`, then
    /// the safeguard. `pubkey` is left for the author's signature to fill.
    pub fn to_event(&self, created_at: i64) -> Result<Event> {
        if self.guardian_keys.is_empty() {
            return Err(ProtocolError::input("at least one guardian key is required"));
        }
        if self.threshold == 0 {
            return Err(ProtocolError::input("threshold must be positive"));
        }
        if self.threshold > MAX_THRESHOLD {
            return Err(ProtocolError::input(format!(
                "threshold must be at most {MAX_THRESHOLD}"
            )));
        }
        let keys = self
            .guardian_keys
            .iter()
            .map(|key| canonical_key_hex("guardian key", key))
            .collect::<Result<Vec<_>>>()?;

        let mut event = Event::new(EventKind::RecoveryKeysSetup, created_at);
        for key in keys {
            event.tags.push_unique(Tag::PublicKey(key));
        }
        event
            .tags
            .push_unique(Tag::Threshold(self.threshold.to_string()));
        event
            .tags
            .push_unique(Tag::Safeguard(Safeguard::RecoveryKeysSetup));
        event.content = self.comment.clone();

        tracing::debug!(
            guardians = self.guardian_keys.len(),
            threshold = self.threshold,
            "recovery setup built"
        );
        Ok(event)
    }

    /// Validate, then read the setup back out of an event.
    pub fn from_event(event: &Event) -> Result<Self> {
        validate_recovery_keys_setup(event)?;
        let threshold = event
            .tags
            .first_value(TAG_THRESHOLD)
            .map(parse_threshold)
            .ok_or(ValidationError::MissingOrDuplicateThreshold)??;
        Ok(Self {
            guardian_keys: guardian_keys(event),
            threshold,
            comment: event.content.clone(),
        })
    }
}

/// Guardian keys as listed in `p` tags, lowercased, in order, first
/// occurrence wins. Keys differing only in hex case are one guardian.
pub(crate) fn guardian_keys(event: &Event) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in event.tags.find_all(TAG_PUBLIC_KEY).filter_map(Tag::value) {
        let key = key.to_ascii_lowercase();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Base-10, optional sign, no whitespace, must fit an i64, must be > 0.
/// Everything the builder accepts parses back.
fn parse_threshold(raw: &str) -> Result<u64, ValidationError> {
    let value: i64 = raw.parse().map_err(|_| ValidationError::ThresholdMalformed)?;
    if value <= 0 {
        return Err(ValidationError::ThresholdNotPositive);
    }
    Ok(value as u64)
}

/// Structural validation of a recovery-keys setup event.
///
/// The checks, in order:
///
/// 1. **Kind** — must be 51.
/// 2. **Safeguard** — exactly one `recovery-keys-setup`, with no value.
/// 3. **Threshold tag** — exactly one, carrying exactly one value.
/// 4. **Threshold value** — a base-10 integer, strictly positive.
/// 5. **Guardians** — at least one `p` tag.
///
/// Author, signature and `created_at` are not checked here.
pub fn validate_recovery_keys_setup(event: &Event) -> Result<()> {
    // 1. Kind.
    check_kind(event, EventKind::RecoveryKeysSetup)?;

    // 2. Safeguard.
    check_safeguard(event, Safeguard::RecoveryKeysSetup)?;

    // 3. Threshold tag shape.
    let mut thresholds = event.tags.find_all(TAG_THRESHOLD);
    let (Some(threshold), None) = (thresholds.next(), thresholds.next()) else {
        return Err(ValidationError::MissingOrDuplicateThreshold.into());
    };
    let [value] = threshold.values() else {
        return Err(ValidationError::ThresholdMalformed.into());
    };

    // 4. Threshold value.
    parse_threshold(value)?;

    // 5. At least one guardian.
    if !event.tags.contains_name(TAG_PUBLIC_KEY) {
        return Err(ValidationError::NoGuardianKeys.into());
    }

    Ok(())
}
