//! # Command Handlers
//!
//! One function per subcommand. Each returns the JSON value to print, so
//! `main` owns stdout and the handlers stay testable.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;

use keyward_protocol::attestation::{
    open_private_attestation, read_public_attestation, validate_attestation, Attestation,
    AttestationKind, AttestationSecret, Disclosure,
};
use keyward_protocol::config::EventKind;
use keyward_protocol::cosign::{attach_co_signatures, sign_co_signature, verify_co_signature};
use keyward_protocol::crypto::keys::Keypair;
use keyward_protocol::event::{unix_now, Event};
use keyward_protocol::migration::{
    validate_key_migration_and_revocation, KeyMigrationAndRevocation,
};
use keyward_protocol::recovery::{
    evaluate_quorum, validate_recovery_keys_setup, RecoveryKeysSetup,
};

use crate::cli::{
    AttachArgs, AttestArgs, AuthorArgs, CosignArgs, MigrateArgs, OpenArgs, QuorumArgs,
    RevokeArgs, SetupArgs, ValidateArgs, VerifyCosigArgs,
};

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

/// Read an event from a file, or from stdin when the path is `-`.
pub fn read_event(path: &Path) -> Result<Event> {
    let json = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event from {}", path.display()))?
    };
    Event::from_json(json.trim()).with_context(|| format!("{} is not an event", path.display()))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("failed to serialize output")
}

fn keypair(secret_hex: &str) -> Result<Keypair> {
    Keypair::from_hex(secret_hex.trim()).context("invalid secret key")
}

/// The subject key: explicit, or the public half of the author's secret.
fn subject_key(explicit: Option<String>, author: &AuthorArgs) -> Result<String> {
    match (explicit, &author.secret_key) {
        (Some(subject), _) => Ok(subject),
        (None, Some(secret)) => Ok(keypair(secret)?.public_key_hex()),
        (None, None) => bail!("either --subject or --secret-key is required"),
    }
}

/// Sign as author if a secret key was given, then emit.
fn finish(mut event: Event, secret_key: Option<&str>) -> Result<Value> {
    if let Some(secret) = secret_key {
        event.sign(&keypair(secret)?).context("failed to sign event")?;
    }
    to_value(&event)
}

fn secret_from(key: Option<&str>, salt: Option<&str>) -> Result<Option<AttestationSecret>> {
    match (key, salt) {
        (Some(key), Some(salt)) => Ok(Some(
            AttestationSecret::from_hex(key, salt).context("invalid attestation secret")?,
        )),
        (None, None) => Ok(None),
        _ => bail!("--key and --salt must be given together"),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub fn keygen() -> Result<Value> {
    let keypair = Keypair::generate();
    tracing::info!(public_key = %keypair.public_key_hex(), "keypair generated");
    Ok(json!({
        "public_key": keypair.public_key_hex(),
        "secret_key": keypair.secret_key_hex().as_str(),
    }))
}

pub fn setup(args: SetupArgs) -> Result<Value> {
    let created_at = args.author.created_at.unwrap_or_else(unix_now);
    let event = RecoveryKeysSetup::new(args.guardians, args.threshold, args.comment)
        .to_event(created_at)
        .context("failed to build recovery setup")?;
    finish(event, args.author.secret_key.as_deref())
}

pub fn migrate(args: MigrateArgs) -> Result<Value> {
    let subject = subject_key(args.subject, &args.author)?;
    let created_at = args.author.created_at.unwrap_or_else(unix_now);
    let event =
        KeyMigrationAndRevocation::migration(subject, args.new_key, args.setup_ref, args.comment)
            .to_event(created_at)
            .context("failed to build migration")?;
    finish(event, args.author.secret_key.as_deref())
}

pub fn revoke(args: RevokeArgs) -> Result<Value> {
    let subject = subject_key(args.subject, &args.author)?;
    let created_at = args.author.created_at.unwrap_or_else(unix_now);
    let mut revocation = KeyMigrationAndRevocation::revocation(subject, args.comment);
    if let Some(successor) = args.successor_key {
        revocation = revocation.with_successor_key(successor);
    }
    let event = revocation
        .to_event(created_at)
        .context("failed to build revocation")?;
    finish(event, args.author.secret_key.as_deref())
}

pub fn cosign(args: CosignArgs) -> Result<Value> {
    let event = read_event(&args.event)?;
    validate_key_migration_and_revocation(&event).context("refusing to co-sign")?;
    let guardian = keypair(&args.secret_key)?;
    let sig = sign_co_signature(&event, &guardian.secret_key_hex())?;
    Ok(json!({
        "guardian": guardian.public_key_hex(),
        "sig": sig,
    }))
}

pub fn attach(args: AttachArgs) -> Result<Value> {
    let event = attach_co_signatures(read_event(&args.event)?, args.sigs);
    finish(event, args.secret_key.as_deref())
}

pub fn verify_cosig(args: VerifyCosigArgs) -> Result<Value> {
    let event = read_event(&args.event)?;
    let valid = verify_co_signature(&event, &args.guardian, &args.sig)
        .context("malformed guardian key or signature")?;
    if !valid {
        bail!("co-signature does not verify for guardian {}", args.guardian);
    }
    Ok(json!({ "valid": true }))
}

pub fn attest(args: AttestArgs) -> Result<Value> {
    let source = read_event(&args.event)?;
    let attestation = match source.event_kind() {
        Some(EventKind::KeyMigrationAndRevocation) => Attestation::for_migration(&source),
        Some(EventKind::RecoveryKeysSetup) => Attestation::for_recovery_setup(&source),
        _ => bail!("kind {} cannot be attested", source.kind),
    }
    .context("event cannot be attested")?;

    let attestation = match secret_from(args.key.as_deref(), args.salt.as_deref())? {
        Some(secret) => attestation.with_secret(secret),
        None => attestation,
    };
    let created_at = args.author.created_at.unwrap_or_else(unix_now);
    let event = attestation
        .to_event(created_at)
        .context("failed to build attestation")?;
    finish(event, args.author.secret_key.as_deref())
}

pub fn open(args: OpenArgs) -> Result<Value> {
    let event = read_event(&args.event)?;
    let kind = AttestationKind::of(&event)
        .ok_or_else(|| anyhow!("kind {} is not an attestation", event.kind))?;
    let bundle = match Disclosure::of(&event) {
        Disclosure::Public => read_public_attestation(kind, &event)?,
        Disclosure::Private => {
            let secret = secret_from(args.key.as_deref(), args.salt.as_deref())?
                .ok_or_else(|| anyhow!("private attestation: --key and --salt are required"))?;
            open_private_attestation(kind, &event, &secret)?
        }
    };
    Ok(json!({
        "kind": kind,
        "disclosure": Disclosure::of(&event),
        "subject_key": bundle.subject_key,
        "event_ref": bundle.event_ref,
        "payload": bundle.payload,
    }))
}

pub fn validate(args: ValidateArgs) -> Result<Value> {
    let event = read_event(&args.event)?;
    let outcome = match event.event_kind() {
        Some(EventKind::KeyMigrationAndRevocation) => validate_key_migration_and_revocation(&event),
        Some(EventKind::RecoveryKeysSetup) => validate_recovery_keys_setup(&event),
        Some(_) => match AttestationKind::of(&event) {
            Some(kind) => validate_attestation(kind, &event),
            None => bail!("kind {} is not a Keyward event", event.kind),
        },
        None => bail!("kind {} is not a Keyward event", event.kind),
    };
    if let Err(err) = outcome {
        tracing::warn!(code = err.code(), "validation failed");
        return Err(anyhow!(err).context(format!("invalid kind {} event", event.kind)));
    }

    if args.check_signature {
        let signed = event
            .verify_signature()
            .context("malformed author key or signature")?;
        if !signed {
            bail!("author signature does not verify");
        }
    }
    let created = chrono::DateTime::from_timestamp(event.created_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    Ok(json!({
        "valid": true,
        "kind": event.kind,
        "created": created,
        "signature_checked": args.check_signature,
    }))
}

pub fn quorum(args: QuorumArgs) -> Result<Value> {
    let migration = read_event(&args.migration)?;
    let setup = read_event(&args.setup)?;
    let report = evaluate_quorum(&migration, &setup).context("quorum cannot be evaluated")?;
    let mut value = to_value(&report)?;
    value["satisfied"] = json!(report.is_satisfied());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn write_value(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    fn author(secret: &Keypair) -> AuthorArgs {
        AuthorArgs {
            secret_key: Some(secret.secret_key_hex().to_string()),
            created_at: Some(1_725_402_764),
        }
    }

    #[test]
    fn test_read_event_from_file() {
        let evt = Event::new(EventKind::RecoveryKeysSetup, 5);
        let file = write_value(&serde_json::to_value(&evt).unwrap());
        assert_eq!(read_event(file.path()).unwrap(), evt);
    }

    #[test]
    fn test_read_event_reports_missing_file() {
        let err = read_event(&PathBuf::from("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read event"));
    }

    #[test]
    fn test_subject_from_secret_key() {
        let kp = Keypair::generate();
        assert_eq!(subject_key(None, &author(&kp)).unwrap(), kp.public_key_hex());
        assert!(subject_key(None, &AuthorArgs::default()).is_err());
    }

    #[test]
    fn test_setup_migrate_cosign_quorum_pipeline() {
        let alice = Keypair::generate();
        let guardian = Keypair::generate();

        let setup_value = setup(SetupArgs {
            guardians: vec![guardian.public_key_hex()],
            threshold: 1,
            comment: String::new(),
            author: author(&alice),
        })
        .unwrap();
        let setup_file = write_value(&setup_value);
        let setup_id = setup_value["id"].as_str().unwrap().to_string();

        let migration_value = migrate(MigrateArgs {
            subject: Some(alice.public_key_hex()),
            new_key: Keypair::generate().public_key_hex(),
            setup_ref: setup_id,
            comment: "new device".into(),
            author: AuthorArgs {
                secret_key: None,
                created_at: Some(1_725_402_774),
            },
        })
        .unwrap();
        let migration_file = write_value(&migration_value);

        let cosig = cosign(CosignArgs {
            event: migration_file.path().to_path_buf(),
            secret_key: guardian.secret_key_hex().to_string(),
        })
        .unwrap();
        let sig = cosig["sig"].as_str().unwrap().to_string();

        let attached = attach(AttachArgs {
            event: migration_file.path().to_path_buf(),
            sigs: vec![sig.clone()],
            secret_key: Some(alice.secret_key_hex().to_string()),
        })
        .unwrap();
        let attached_file = write_value(&attached);

        assert!(verify_cosig(VerifyCosigArgs {
            event: attached_file.path().to_path_buf(),
            guardian: guardian.public_key_hex(),
            sig,
        })
        .is_ok());

        let report = quorum(QuorumArgs {
            migration: attached_file.path().to_path_buf(),
            setup: setup_file.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(report["satisfied"], json!(true));

        let checked = validate(ValidateArgs {
            event: attached_file.path().to_path_buf(),
            check_signature: true,
        })
        .unwrap();
        assert_eq!(checked["valid"], json!(true));
    }

    #[test]
    fn test_private_attest_then_open() {
        let alice = Keypair::generate();
        let setup_value = setup(SetupArgs {
            guardians: vec![Keypair::generate().public_key_hex()],
            threshold: 1,
            comment: String::new(),
            author: author(&alice),
        })
        .unwrap();
        let setup_file = write_value(&setup_value);

        let key = "11".repeat(32);
        let salt = "22".repeat(32);
        let attested = attest(AttestArgs {
            event: setup_file.path().to_path_buf(),
            key: Some(key.clone()),
            salt: Some(salt.clone()),
            author: author(&Keypair::generate()),
        })
        .unwrap();
        assert_eq!(attested["kind"], json!(30051));
        let attested_file = write_value(&attested);

        let without_secret = open(OpenArgs {
            event: attested_file.path().to_path_buf(),
            key: None,
            salt: None,
        });
        assert!(without_secret.is_err());

        let opened = open(OpenArgs {
            event: attested_file.path().to_path_buf(),
            key: Some(key),
            salt: Some(salt),
        })
        .unwrap();
        assert_eq!(opened["subject_key"], json!(alice.public_key_hex()));
        assert_eq!(opened["disclosure"], json!("private"));
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let evt = json!({
            "kind": 51,
            "created_at": 0,
            "tags": [["p", "aa"], ["threshold", "0"], ["recovery-keys-setup"]],
            "content": ""
        });
        let file = write_value(&evt);
        let err = validate(ValidateArgs {
            event: file.path().to_path_buf(),
            check_signature: false,
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("threshold"));
    }

    #[test]
    fn test_revoke_without_subject_fails() {
        let res = revoke(RevokeArgs {
            subject: None,
            successor_key: None,
            comment: String::new(),
            author: AuthorArgs::default(),
        });
        assert!(res.is_err());
    }
}
