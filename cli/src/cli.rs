//! # CLI Interface
//!
//! Defines the command-line argument structure for `keyward` using `clap`
//! derive. Events go in as JSON files (or `-` for stdin) and come out as
//! JSON on stdout, so commands compose with pipes:
//!
//! ```text
//! keyward migrate --new-key … --setup-ref … | keyward cosign - --secret-key …
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Key migration, revocation and social recovery over signed events.
#[derive(Parser, Debug)]
#[command(
    name = "keyward",
    about = "Build, co-sign and check Keyward events",
    version,
    propagate_version = true
)]
pub struct KeywardCli {
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "KEYWARD_LOG", default_value = "warn")]
    pub log: String,

    /// Log output format. Logs always go to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh Ed25519 keypair.
    Keygen,
    /// Build a recovery-keys setup (kind 51).
    Setup(SetupArgs),
    /// Build a key migration (kind 50) approved under a recovery setup.
    Migrate(MigrateArgs),
    /// Build a key revocation (kind 50).
    Revoke(RevokeArgs),
    /// Produce a guardian co-signature over a migration or revocation.
    Cosign(CosignArgs),
    /// Attach collected co-signatures to an event.
    Attach(AttachArgs),
    /// Check one co-signature against one guardian key.
    VerifyCosig(VerifyCosigArgs),
    /// Attest a signed migration or setup event (kind 30050 / 30051).
    Attest(AttestArgs),
    /// Read a public attestation, or decrypt a private one.
    Open(OpenArgs),
    /// Structurally validate any Keyward event.
    Validate(ValidateArgs),
    /// Count guardian approvals of a migration under its setup.
    Quorum(QuorumArgs),
    /// Print version information and exit.
    Version,
}

/// Author options shared by every building command.
#[derive(Args, Debug, Clone, Default)]
pub struct AuthorArgs {
    /// Hex-encoded Ed25519 secret key. When given, the event is signed.
    ///
    /// **Prefer the environment variable** over the flag; flags end up in
    /// shell history.
    #[arg(long, env = "KEYWARD_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Unix timestamp for `created_at`. Defaults to now.
    #[arg(long)]
    pub created_at: Option<i64>,
}

/// Arguments for the `setup` subcommand.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Guardian public key (hex). Repeat for each guardian.
    #[arg(long = "guardian", short = 'g', required = true)]
    pub guardians: Vec<String>,

    /// Number of guardians that must approve a migration.
    #[arg(long, short = 't')]
    pub threshold: u64,

    /// Free-form comment, stored as the event content.
    #[arg(long, default_value = "")]
    pub comment: String,

    #[command(flatten)]
    pub author: AuthorArgs,
}

/// Arguments for the `migrate` subcommand.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Key being retired (hex). Derived from `--secret-key` when omitted.
    #[arg(long)]
    pub subject: Option<String>,

    /// Key to migrate to (hex).
    #[arg(long)]
    pub new_key: String,

    /// Id of the recovery-keys setup whose guardians approve this migration.
    #[arg(long)]
    pub setup_ref: String,

    #[arg(long, default_value = "")]
    pub comment: String,

    #[command(flatten)]
    pub author: AuthorArgs,
}

/// Arguments for the `revoke` subcommand.
#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Key being revoked (hex). Derived from `--secret-key` when omitted.
    #[arg(long)]
    pub subject: Option<String>,

    /// Optional replacement key (hex).
    #[arg(long)]
    pub successor_key: Option<String>,

    #[arg(long, default_value = "")]
    pub comment: String,

    #[command(flatten)]
    pub author: AuthorArgs,
}

/// Arguments for the `cosign` subcommand.
#[derive(Args, Debug)]
pub struct CosignArgs {
    /// Event JSON file, or `-` for stdin.
    pub event: PathBuf,

    /// Guardian's hex-encoded secret key.
    #[arg(long, env = "KEYWARD_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,
}

/// Arguments for the `attach` subcommand.
#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Event JSON file, or `-` for stdin.
    pub event: PathBuf,

    /// Co-signature (hex). Repeat for each signature; all go in one tag.
    #[arg(long = "sig", short = 's', required = true)]
    pub sigs: Vec<String>,

    /// Re-sign as author after attaching. Attaching changes the event id.
    #[arg(long, env = "KEYWARD_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
}

/// Arguments for the `verify-cosig` subcommand.
#[derive(Args, Debug)]
pub struct VerifyCosigArgs {
    /// Event JSON file, or `-` for stdin.
    pub event: PathBuf,

    /// Guardian public key (hex).
    #[arg(long)]
    pub guardian: String,

    /// Co-signature (hex).
    #[arg(long)]
    pub sig: String,
}

/// Arguments for the `attest` subcommand.
#[derive(Args, Debug)]
pub struct AttestArgs {
    /// Signed migration (kind 50) or setup (kind 51) event, or `-`.
    pub event: PathBuf,

    /// Attestation key (hex, 32 bytes). With `--salt`, makes it private.
    #[arg(long, requires = "salt")]
    pub key: Option<String>,

    /// Attestation salt (hex, 32 bytes).
    #[arg(long, requires = "key")]
    pub salt: Option<String>,

    #[command(flatten)]
    pub author: AuthorArgs,
}

/// Arguments for the `open` subcommand.
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Attestation event JSON file, or `-` for stdin.
    pub event: PathBuf,

    /// Attestation key (hex). Required for private attestations.
    #[arg(long, requires = "salt")]
    pub key: Option<String>,

    /// Attestation salt (hex). Required for private attestations.
    #[arg(long, requires = "key")]
    pub salt: Option<String>,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Event JSON file, or `-` for stdin.
    pub event: PathBuf,

    /// Also check the id and author signature.
    #[arg(long)]
    pub check_signature: bool,
}

/// Arguments for the `quorum` subcommand.
#[derive(Args, Debug)]
pub struct QuorumArgs {
    /// Co-signed migration or revocation event.
    #[arg(long)]
    pub migration: PathBuf,

    /// Recovery-keys setup event.
    #[arg(long)]
    pub setup: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        KeywardCli::command().debug_assert();
    }

    #[test]
    fn test_parses_repeated_guardians() {
        let cli = KeywardCli::try_parse_from([
            "keyward", "setup", "-g", "aa", "-g", "bb", "--threshold", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Setup(args) => {
                assert_eq!(args.guardians, vec!["aa", "bb"]);
                assert_eq!(args.threshold, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_private_attest_needs_both_halves() {
        let res = KeywardCli::try_parse_from(["keyward", "attest", "-", "--key", "00"]);
        assert!(res.is_err());
    }
}
