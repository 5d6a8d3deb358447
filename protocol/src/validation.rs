//! Rule checks shared by every validator.
//!
//! Each event family has its own ordered list of checks (see the
//! `verification` modules), but a handful of rules recur everywhere: the
//! kind must match, the safeguard must appear exactly once with no value,
//! and certain tags must appear exactly once. They live here so each
//! family's validator reads as its rule list and nothing else.

use crate::config::{EventKind, Safeguard};
use crate::error::ValidationError;
use crate::event::Event;

/// Rule: the event's kind is `expected`.
pub(crate) fn check_kind(event: &Event, expected: EventKind) -> Result<(), ValidationError> {
    if event.kind != expected.as_u16() {
        return Err(ValidationError::InvalidKind {
            expected: expected.as_u16(),
            got: event.kind,
        });
    }
    Ok(())
}

/// Rule: exactly one `guard` tag, and it carries no value.
pub(crate) fn check_safeguard(event: &Event, guard: Safeguard) -> Result<(), ValidationError> {
    let mut found = event.tags.find_all(guard.as_str());
    let (Some(tag), None) = (found.next(), found.next()) else {
        return Err(ValidationError::MissingOrDuplicateSafeguard(guard));
    };
    if !tag.values().is_empty() {
        return Err(ValidationError::SafeguardHasValue(guard));
    }
    Ok(())
}

/// Rule: exactly one tag named `name`, or `err`.
pub(crate) fn check_exactly_one(
    event: &Event,
    name: &str,
    err: ValidationError,
) -> Result<(), ValidationError> {
    if event.tags.count(name) != 1 {
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tag;

    fn event_with(tags: &[&[&str]]) -> Event {
        let mut evt = Event::new(EventKind::RecoveryKeysSetup, 0);
        for tag in tags {
            evt.tags.push(Tag::from(*tag));
        }
        evt
    }

    #[test]
    fn test_kind_mismatch_reports_both() {
        let mut evt = event_with(&[]);
        evt.kind = 1;
        assert_eq!(
            check_kind(&evt, EventKind::RecoveryKeysSetup),
            Err(ValidationError::InvalidKind { expected: 51, got: 1 })
        );
    }

    #[test]
    fn test_safeguard_rules() {
        let guard = Safeguard::RecoveryKeysSetup;
        assert!(check_safeguard(&event_with(&[&["recovery-keys-setup"]]), guard).is_ok());
        assert_eq!(
            check_safeguard(&event_with(&[]), guard),
            Err(ValidationError::MissingOrDuplicateSafeguard(guard))
        );
        assert_eq!(
            check_safeguard(
                &event_with(&[&["recovery-keys-setup"], &["recovery-keys-setup"]]),
                guard
            ),
            Err(ValidationError::MissingOrDuplicateSafeguard(guard))
        );
        assert_eq!(
            check_safeguard(&event_with(&[&["recovery-keys-setup", "x"]]), guard),
            Err(ValidationError::SafeguardHasValue(guard))
        );
    }

    #[test]
    fn test_exactly_one() {
        let evt = event_with(&[&["d", "a"], &["p", "b"], &["p", "c"]]);
        let err = ValidationError::MissingOrDuplicateIdentifier;
        assert!(check_exactly_one(&evt, "d", err).is_ok());
        assert_eq!(check_exactly_one(&evt, "p", err), Err(err));
        assert_eq!(check_exactly_one(&evt, "e", err), Err(err));
    }
}
