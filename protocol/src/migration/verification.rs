//! Structural validation of kind-50 events.
//!
//! The presence of a `new-key` tag picks the branch: one means migration,
//! none means revocation. The two safeguards never appear together.

use crate::config::{EventKind, Safeguard, TAG_EVENT, TAG_NEW_KEY, TAG_SUCCESSOR_KEY};
use crate::error::{Result, ValidationError};
use crate::event::Event;
use crate::validation::{check_exactly_one, check_kind, check_safeguard};

/// Validate a key-migration-and-revocation event.
///
/// The checks, in order:
///
/// 1. **Kind** — must be 50.
/// 2. **New key** — at most one `new-key` tag.
/// 3. **Migration branch** (one `new-key`): exactly one valueless
///    `key-migration`, exactly one `e` reference, no `key-revocation`.
/// 4. **Revocation branch** (no `new-key`): exactly one valueless
///    `key-revocation`, at most one `successor-key`, no `key-migration`.
///
/// Content is free-form and never checked.
pub fn validate_key_migration_and_revocation(event: &Event) -> Result<()> {
    check_kind(event, EventKind::KeyMigrationAndRevocation)?;

    let new_keys = event.tags.count(TAG_NEW_KEY);
    if new_keys > 1 {
        return Err(ValidationError::TooManyNewKeys.into());
    }

    if new_keys == 1 {
        check_safeguard(event, Safeguard::KeyMigration)?;
        check_exactly_one(event, TAG_EVENT, ValidationError::MissingOrDuplicateReference)?;
        if event.tags.contains_name(Safeguard::KeyRevocation.as_str()) {
            return Err(ValidationError::ConflictingSafeguards.into());
        }
    } else {
        check_safeguard(event, Safeguard::KeyRevocation)?;
        if event.tags.count(TAG_SUCCESSOR_KEY) > 1 {
            return Err(ValidationError::TooManySuccessorKeys.into());
        }
        if event.tags.contains_name(Safeguard::KeyMigration.as_str()) {
            return Err(ValidationError::ConflictingSafeguards.into());
        }
    }

    Ok(())
}
