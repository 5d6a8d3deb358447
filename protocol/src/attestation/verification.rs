//! Structural validation of attestation events.
//!
//! Validation never decrypts. A private attestation is judged on the
//! visible parts only: it must keep its claims out of the tags, and its
//! content must at least be base64. Whether the ciphertext actually opens
//! is for [`super::disclosure::open_private_attestation`] to find out.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::TAG_IDENTIFIER;
use crate::error::{FormatError, Result, ValidationError};
use crate::event::Event;
use crate::validation::{check_exactly_one, check_kind, check_safeguard};

use super::builder::public_tag_names;
use super::types::{AttestationKind, Disclosure};

/// Validate an attestation of the given family.
///
/// The checks, in order:
///
/// 1. **Kind** — 30050 or 30051, matching `kind`.
/// 2. **Safeguard** — exactly one, with no value.
/// 3. **Identifier** — exactly one `d` tag.
/// 4. **Private** (non-empty content): no `p`, `e` or payload tag, and the
///    content decodes as standard base64.
/// 5. **Public** (empty content): `p`, `e` and payload tags all present.
pub fn validate_attestation(kind: AttestationKind, event: &Event) -> Result<()> {
    check_kind(event, kind.event_kind())?;
    check_safeguard(event, kind.safeguard())?;
    check_exactly_one(event, TAG_IDENTIFIER, ValidationError::MissingOrDuplicateIdentifier)?;

    let public_tags = public_tag_names(kind);
    match Disclosure::of(event) {
        Disclosure::Private => {
            if public_tags.iter().any(|name| event.tags.contains_name(name)) {
                return Err(ValidationError::PrivateLeaksPublicTags.into());
            }
            if STANDARD.decode(&event.content).is_err() {
                return Err(FormatError::ContentNotBase64.into());
            }
        }
        Disclosure::Public => {
            if !public_tags.iter().all(|name| event.tags.contains_name(name)) {
                return Err(ValidationError::PublicMissingTags.into());
            }
        }
    }
    Ok(())
}

/// [`validate_attestation`] for kind 30050.
pub fn validate_key_migration_attestation(event: &Event) -> Result<()> {
    validate_attestation(AttestationKind::KeyMigration, event)
}

/// [`validate_attestation`] for kind 30051.
pub fn validate_recovery_keys_attestation(event: &Event) -> Result<()> {
    validate_attestation(AttestationKind::RecoveryKeys, event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EventKind, Safeguard};
    use crate::error::ProtocolError;
    use crate::event::Tag;

    const SUBJECT: &str = "9166c289b9f905e55f9e3df9f69d7f356b4a22095f894f4715714aa4b56606af";
    const SETUP_ID: &str = "40808ce2685b0aeaa756d05fc99853db0c79043210a3a949fdbc905ea2984c05";

    fn raw_event(kind: u16, content: &str, tags: &[&[&str]]) -> Event {
        let mut evt = Event::new(EventKind::RecoveryKeysAttestation, 1_725_402_765);
        evt.kind = kind;
        evt.content = content.to_string();
        for tag in tags {
            evt.tags.push(Tag::from(*tag));
        }
        evt
    }

    fn outcome(evt: &Event) -> std::result::Result<(), ProtocolError> {
        validate_recovery_keys_attestation(evt)
    }

    fn structural(code: ValidationError) -> std::result::Result<(), ProtocolError> {
        Err(ProtocolError::Structural(code))
    }

    #[test]
    fn test_recovery_attestation_table() {
        let guard = Safeguard::RecoveryKeysAttestation;
        let cases: Vec<(Event, std::result::Result<(), ProtocolError>)> = vec![
            (
                raw_event(
                    30051,
                    "",
                    &[
                        &["d", SUBJECT],
                        &["p", SUBJECT],
                        &["e", SETUP_ID],
                        &["setup", "{}"],
                        &["recovery-keys-attestation"],
                    ],
                ),
                Ok(()),
            ),
            (
                raw_event(30051, "AgAA", &[&["d", "abc"], &["recovery-keys-attestation"]]),
                Ok(()),
            ),
            (
                raw_event(30050, "AgAA", &[&["d", "abc"], &["recovery-keys-attestation"]]),
                structural(ValidationError::InvalidKind {
                    expected: 30051,
                    got: 30050,
                }),
            ),
            (
                raw_event(30051, "AgAA", &[&["d", "abc"]]),
                structural(ValidationError::MissingOrDuplicateSafeguard(guard)),
            ),
            (
                raw_event(
                    30051,
                    "AgAA",
                    &[
                        &["d", "abc"],
                        &["recovery-keys-attestation"],
                        &["recovery-keys-attestation"],
                    ],
                ),
                structural(ValidationError::MissingOrDuplicateSafeguard(guard)),
            ),
            (
                raw_event(30051, "AgAA", &[&["d", "abc"], &["recovery-keys-attestation", "v"]]),
                structural(ValidationError::SafeguardHasValue(guard)),
            ),
            (
                raw_event(30051, "AgAA", &[&["recovery-keys-attestation"]]),
                structural(ValidationError::MissingOrDuplicateIdentifier),
            ),
            (
                raw_event(
                    30051,
                    "AgAA",
                    &[&["d", "a"], &["d", "b"], &["recovery-keys-attestation"]],
                ),
                structural(ValidationError::MissingOrDuplicateIdentifier),
            ),
            (
                raw_event(
                    30051,
                    "AgAA",
                    &[&["d", "abc"], &["p", SUBJECT], &["recovery-keys-attestation"]],
                ),
                structural(ValidationError::PrivateLeaksPublicTags),
            ),
            (
                raw_event(
                    30051,
                    "AgAA",
                    &[&["d", "abc"], &["setup", "{}"], &["recovery-keys-attestation"]],
                ),
                structural(ValidationError::PrivateLeaksPublicTags),
            ),
            (
                raw_event(
                    30051,
                    "not base64!",
                    &[&["d", "abc"], &["recovery-keys-attestation"]],
                ),
                Err(ProtocolError::Format(FormatError::ContentNotBase64)),
            ),
            (
                raw_event(
                    30051,
                    "",
                    &[
                        &["d", SUBJECT],
                        &["p", SUBJECT],
                        &["e", SETUP_ID],
                        &["recovery-keys-attestation"],
                    ],
                ),
                structural(ValidationError::PublicMissingTags),
            ),
            (
                raw_event(30051, "", &[&["d", SUBJECT], &["recovery-keys-attestation"]]),
                structural(ValidationError::PublicMissingTags),
            ),
        ];

        for (i, (evt, expected)) in cases.iter().enumerate() {
            assert_eq!(outcome(evt), *expected, "case {}", i);
        }
    }

    #[test]
    fn test_migration_attestation_uses_new_key_payload() {
        let public = raw_event(
            30050,
            "",
            &[
                &["d", SUBJECT],
                &["p", SUBJECT],
                &["e", SETUP_ID],
                &["new-key", SUBJECT],
                &["key-migration-attestation"],
            ],
        );
        assert!(validate_key_migration_attestation(&public).is_ok());

        // A `setup` tag is not the payload for this family.
        let wrong_payload = raw_event(
            30050,
            "",
            &[
                &["d", SUBJECT],
                &["p", SUBJECT],
                &["e", SETUP_ID],
                &["setup", "{}"],
                &["key-migration-attestation"],
            ],
        );
        assert_eq!(
            validate_key_migration_attestation(&wrong_payload),
            structural(ValidationError::PublicMissingTags)
        );
    }
}
