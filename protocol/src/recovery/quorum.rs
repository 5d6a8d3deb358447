//! Guardian quorum evaluation.
//!
//! Given a migration (or revocation) event carrying `sigs` and the setup
//! event it points at, count how many *distinct registered guardians*
//! produced a valid co-signature, and compare against the threshold.
//!
//! Signatures aren't positionally bound to guardians, so every signature
//! is tried against every guardian. Each guardian counts at most once no
//! matter how many of their signatures are attached, or how many times
//! (in whatever hex case) the setup lists them. Signatures from keys
//! that aren't in the setup count for nothing.

use serde::{Deserialize, Serialize};

use crate::cosign::{co_signature_digest, co_signatures};
use crate::config::TAG_EVENT;
use crate::crypto::keys::{PublicKey, Signature};
use crate::crypto::signatures::verify_digest;
use crate::error::{Result, ValidationError};
use crate::event::Event;
use crate::migration::validate_key_migration_and_revocation;

use super::setup::{guardian_keys, RecoveryKeysSetup};

/// Outcome of a quorum check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumReport {
    /// Required approvals, from the setup.
    pub threshold: u64,
    /// Distinct guardians registered in the setup.
    pub guardian_count: usize,
    /// Guardian keys with at least one valid co-signature, in setup order.
    pub approvals: Vec<String>,
}

impl QuorumReport {
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    /// Whether enough guardians approved. A setup whose threshold exceeds
    /// its guardian count is never satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.approvals.len() as u64 >= self.threshold
    }
}

/// Evaluate guardian approval of `migration` under `setup`.
///
/// Both events are validated first. If the migration carries an `e`
/// reference and the setup has an id, they must match; the setup must also
/// be authored by the migrating key when both authors are known.
/// Malformed guardian keys or signatures are skipped with a warning, not
/// treated as errors: one garbage signature shouldn't veto the rest.
pub fn evaluate_quorum(migration: &Event, setup: &Event) -> Result<QuorumReport> {
    validate_key_migration_and_revocation(migration)?;
    let config = RecoveryKeysSetup::from_event(setup)?;

    if let Some(reference) = migration.tags.first_value(TAG_EVENT) {
        if !setup.id.is_empty() && reference != setup.id {
            return Err(ValidationError::SetupReferenceMismatch.into());
        }
    }
    if !migration.pubkey.is_empty()
        && !setup.pubkey.is_empty()
        && !migration.pubkey.eq_ignore_ascii_case(&setup.pubkey)
    {
        return Err(ValidationError::SetupReferenceMismatch.into());
    }

    let digest = co_signature_digest(migration);
    let signatures: Vec<Signature> = co_signatures(migration)
        .into_iter()
        .filter_map(|sig| match Signature::from_hex(sig) {
            Ok(sig) => Some(sig),
            Err(_) => {
                tracing::warn!("skipping malformed co-signature");
                None
            }
        })
        .collect();

    let guardians = guardian_keys(setup);
    let mut approvals = Vec::new();
    for guardian in &guardians {
        let Ok(public_key) = PublicKey::from_hex(guardian) else {
            tracing::warn!(guardian = %guardian, "skipping malformed guardian key");
            continue;
        };
        if signatures
            .iter()
            .any(|sig| verify_digest(&public_key, &digest, sig))
        {
            approvals.push(guardian.clone());
        }
    }

    let report = QuorumReport {
        threshold: config.threshold,
        guardian_count: guardians.len(),
        approvals,
    };
    tracing::debug!(
        threshold = report.threshold,
        approvals = report.approval_count(),
        satisfied = report.is_satisfied(),
        "quorum evaluated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosign::{attach_co_signatures, sign_co_signature};
    use crate::crypto::keys::Keypair;
    use crate::error::ProtocolError;
    use crate::event::Tag;
    use crate::migration::KeyMigrationAndRevocation;

    struct Fixture {
        subject: Keypair,
        guardians: Vec<Keypair>,
        setup: Event,
        migration: Event,
    }

    fn fixture(threshold: u64) -> Fixture {
        let subject = Keypair::generate();
        let guardians: Vec<Keypair> = (0..3).map(|_| Keypair::generate()).collect();
        let mut setup = RecoveryKeysSetup::new(
            guardians.iter().map(Keypair::public_key_hex),
            threshold,
            "",
        )
        .to_event(100)
        .unwrap();
        setup.sign(&subject).unwrap();

        let migration = KeyMigrationAndRevocation::migration(
            subject.public_key_hex(),
            Keypair::generate().public_key_hex(),
            setup.id.clone(),
            "lost my phone",
        )
        .to_event(200)
        .unwrap();

        Fixture {
            subject,
            guardians,
            setup,
            migration,
        }
    }

    fn cosign(fx: &Fixture, which: &[usize]) -> Event {
        let sigs: Vec<String> = which
            .iter()
            .map(|&i| sign_co_signature(&fx.migration, &fx.guardians[i].secret_key_hex()).unwrap())
            .collect();
        attach_co_signatures(fx.migration.clone(), sigs)
    }

    #[test]
    fn test_two_of_three_satisfied() {
        let fx = fixture(2);
        let report = evaluate_quorum(&cosign(&fx, &[0, 2]), &fx.setup).unwrap();
        assert_eq!(report.threshold, 2);
        assert_eq!(report.guardian_count, 3);
        assert_eq!(
            report.approvals,
            vec![fx.guardians[0].public_key_hex(), fx.guardians[2].public_key_hex()]
        );
        assert!(report.is_satisfied());
    }

    #[test]
    fn test_one_of_three_not_satisfied() {
        let fx = fixture(2);
        let report = evaluate_quorum(&cosign(&fx, &[1]), &fx.setup).unwrap();
        assert_eq!(report.approval_count(), 1);
        assert!(!report.is_satisfied());
    }

    #[test]
    fn test_repeated_guardian_counts_once() {
        let fx = fixture(2);
        let once = cosign(&fx, &[1]);
        let sig = sign_co_signature(&fx.migration, &fx.guardians[1].secret_key_hex()).unwrap();
        let twice = attach_co_signatures(once, [sig.clone(), sig]);
        let report = evaluate_quorum(&twice, &fx.setup).unwrap();
        assert_eq!(report.approval_count(), 1);
    }

    #[test]
    fn test_guardian_listed_in_both_cases_counts_once() {
        let subject = Keypair::generate();
        let guardian = Keypair::generate();
        let mut setup = RecoveryKeysSetup::new([guardian.public_key_hex()], 2, "")
            .to_event(100)
            .unwrap();
        setup
            .tags
            .push(Tag::PublicKey(guardian.public_key_hex().to_uppercase()));
        setup.sign(&subject).unwrap();

        let migration = KeyMigrationAndRevocation::migration(
            subject.public_key_hex(),
            Keypair::generate().public_key_hex(),
            setup.id.clone(),
            "",
        )
        .to_event(200)
        .unwrap();
        let sig = sign_co_signature(&migration, &guardian.secret_key_hex()).unwrap();
        let migration = attach_co_signatures(migration, [sig]);

        let report = evaluate_quorum(&migration, &setup).unwrap();
        assert_eq!(report.guardian_count, 1);
        assert_eq!(report.approvals, vec![guardian.public_key_hex()]);
        assert!(!report.is_satisfied());
    }

    #[test]
    fn test_outsider_signatures_ignored() {
        let fx = fixture(1);
        let outsider = Keypair::generate();
        let sig = sign_co_signature(&fx.migration, &outsider.secret_key_hex()).unwrap();
        let evt = attach_co_signatures(fx.migration.clone(), [sig]);
        let report = evaluate_quorum(&evt, &fx.setup).unwrap();
        assert_eq!(report.approval_count(), 0);
    }

    #[test]
    fn test_malformed_signatures_skipped() {
        let fx = fixture(1);
        let good = sign_co_signature(&fx.migration, &fx.guardians[0].secret_key_hex()).unwrap();
        let evt = attach_co_signatures(fx.migration.clone(), ["zz".to_string(), good]);
        let report = evaluate_quorum(&evt, &fx.setup).unwrap();
        assert!(report.is_satisfied());
    }

    #[test]
    fn test_unreachable_threshold() {
        let fx = fixture(5);
        let report = evaluate_quorum(&cosign(&fx, &[0, 1, 2]), &fx.setup).unwrap();
        assert_eq!(report.approval_count(), 3);
        assert!(!report.is_satisfied());
    }

    #[test]
    fn test_reference_mismatch() {
        let fx = fixture(1);
        let mut other_setup = fx.setup.clone();
        other_setup.created_at += 1;
        other_setup.sign(&fx.subject).unwrap();
        let err = evaluate_quorum(&cosign(&fx, &[0]), &other_setup).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::SetupReferenceMismatch));
    }

    #[test]
    fn test_setup_from_someone_else() {
        let fx = fixture(1);
        let mut setup = fx.setup.clone();
        setup.pubkey = Keypair::generate().public_key_hex();
        setup.id.clear();
        let err = evaluate_quorum(&cosign(&fx, &[0]), &setup).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::SetupReferenceMismatch));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let fx = fixture(1);
        let err = evaluate_quorum(&fx.setup, &fx.setup).unwrap_err();
        assert!(matches!(err, ProtocolError::Structural(_)));
        let err = evaluate_quorum(&fx.migration, &fx.migration).unwrap_err();
        assert!(matches!(err, ProtocolError::Structural(_)));
    }
}
