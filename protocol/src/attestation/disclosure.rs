//! Reading attestations back.
//!
//! Public attestations are read straight from their tags. Private ones
//! need the attestor's [`AttestationSecret`]; opening them also proves the
//! `d` tag really belongs to the subject inside, so a valid ciphertext
//! can't be replayed under someone else's pseudonym.

use crate::config::{TAG_EVENT, TAG_IDENTIFIER, TAG_PUBLIC_KEY};
use crate::crypto::encryption::decrypt;
use crate::error::{FormatError, ProtocolError, Result, ValidationError};
use crate::event::{Event, Tags};
use crate::identity::derive_attestation_identifier;

use super::types::{AttestationBundle, AttestationKind, AttestationSecret, Disclosure};
use super::verification::validate_attestation;

/// Pull `p`, `e` and payload out of `tags`, each exactly once.
fn bundle_from(kind: AttestationKind, tags: &Tags) -> Result<AttestationBundle> {
    let exactly_one = |name: &str| -> Result<String> {
        let mut found = tags.find_all(name);
        match (found.next().and_then(|t| t.value()), found.next()) {
            (Some(value), None) => Ok(value.to_string()),
            _ => Err(ValidationError::PublicMissingTags.into()),
        }
    };
    Ok(AttestationBundle {
        subject_key: exactly_one(TAG_PUBLIC_KEY)?,
        event_ref: exactly_one(TAG_EVENT)?,
        payload: exactly_one(kind.payload_tag())?,
    })
}

/// Read a public attestation's claims.
///
/// The `d` tag of a public attestation is the subject key itself; a
/// mismatch is reported as `IdentifierMismatch`.
pub fn read_public_attestation(kind: AttestationKind, event: &Event) -> Result<AttestationBundle> {
    validate_attestation(kind, event)?;
    if Disclosure::of(event) != Disclosure::Public {
        return Err(ProtocolError::input(
            "attestation is private; open it with its secret",
        ));
    }
    let bundle = bundle_from(kind, &event.tags)?;
    if event.tags.first_value(TAG_IDENTIFIER) != Some(bundle.subject_key.as_str()) {
        return Err(ValidationError::IdentifierMismatch.into());
    }
    Ok(bundle)
}

/// Decrypt a private attestation and check it against its `d` tag.
///
/// Errors: `Crypto` if the secret doesn't open the content,
/// `Format(PayloadNotJson)` if it opens to something that isn't a tag
/// array, `PublicMissingTags` if a claim is missing or repeated, and
/// `IdentifierMismatch` if the `d` tag wasn't derived from the subject
/// inside.
pub fn open_private_attestation(
    kind: AttestationKind,
    event: &Event,
    secret: &AttestationSecret,
) -> Result<AttestationBundle> {
    validate_attestation(kind, event)?;
    if Disclosure::of(event) != Disclosure::Private {
        return Err(ProtocolError::input(
            "attestation is public; read it from its tags",
        ));
    }

    let plaintext = zeroize::Zeroizing::new(decrypt(&event.content, secret.key(), secret.salt())?);
    let tags: Tags = serde_json::from_slice(&plaintext)
        .map_err(|e| FormatError::PayloadNotJson(e.to_string()))?;
    let bundle = bundle_from(kind, &tags)?;

    let expected = derive_attestation_identifier(&bundle.subject_key, secret.key(), secret.salt())?;
    if event.tags.first_value(TAG_IDENTIFIER) != Some(expected.as_str()) {
        return Err(ValidationError::IdentifierMismatch.into());
    }

    tracing::debug!(kind = %kind, "private attestation opened");
    Ok(bundle)
}
