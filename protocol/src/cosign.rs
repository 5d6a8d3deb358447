//! Guardian co-signatures.
//!
//! A migration is only as good as the guardians who vouch for it. Each
//! guardian signs the migration event independently and hands the hex
//! signature back out of band; the subject (or anyone) then attaches the
//! collected signatures as a single `["sigs", ...]` tag.
//!
//! ## Signing scope
//!
//! A co-signature covers the event's canonical serialization with **every
//! `sigs` tag removed**. Signing and verifying use the same scope, so
//!
//! - attaching signatures never invalidates the ones already attached,
//! - a guardian can sign before or after others have been attached,
//! - verification is independent of attachment order.
//!
//! Positional correlation between signatures and guardian keys is out of
//! band. [`crate::recovery::quorum`] simply tries every signature against
//! every guardian.

use crate::config::TAG_CO_SIGNATURES;
use crate::crypto::signatures::{sign_digest_hex, verify_hex};
use crate::error::{Result, ValidationError};
use crate::event::{Event, Tag};

/// The 32-byte digest guardians sign: the event with all `sigs` tags
/// stripped, canonically serialized, SHA-256'd.
pub fn co_signature_digest(event: &Event) -> [u8; 32] {
    let mut stripped = event.clone();
    stripped.tags.remove_all(TAG_CO_SIGNATURES);
    stripped.digest()
}

/// Append one `["sigs", sig1, sig2, ...]` tag.
///
/// Insert-if-absent: an identical `sigs` tuple is skipped, a different one
/// is added alongside. An empty signature list attaches nothing.
pub fn attach_co_signatures<I, S>(mut event: Event, sigs: I) -> Event
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let sigs: Vec<String> = sigs.into_iter().map(Into::into).collect();
    if sigs.is_empty() {
        tracing::debug!("no co-signatures to attach");
        return event;
    }
    let count = sigs.len();
    if event.tags.push_unique(Tag::CoSignatures(sigs)) {
        tracing::debug!(count, "co-signatures attached");
    }
    event
}

/// Produce a guardian's co-signature over `event`.
///
/// The event must already name its author; a migration without a subject
/// key is not something a guardian should be vouching for.
pub fn sign_co_signature(event: &Event, private_key_hex: &str) -> Result<String> {
    if event.pubkey.is_empty() {
        return Err(ValidationError::MissingAuthorKey.into());
    }
    Ok(sign_digest_hex(private_key_hex, &co_signature_digest(event))?)
}

/// Check one co-signature against one guardian key.
///
/// `Err(Input)` for malformed hex, wrong lengths or a key that isn't a curve
/// point; `Ok(false)` for a well-formed signature that doesn't verify.
pub fn verify_co_signature(event: &Event, pubkey_hex: &str, sig_hex: &str) -> Result<bool> {
    Ok(verify_hex(pubkey_hex, &co_signature_digest(event), sig_hex)?)
}

/// Every co-signature on the event, across all `sigs` tags, in order.
pub fn co_signatures(event: &Event) -> Vec<&str> {
    event
        .tags
        .find_all(TAG_CO_SIGNATURES)
        .flat_map(|tag| tag.values().iter().map(String::as_str))
        .collect()
}
