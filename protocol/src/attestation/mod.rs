//! # Attestation Module
//!
//! Third-party statements about migrations (kind 30050) and recovery
//! setups (kind 30051). Both kinds are parameterized-replaceable: the `d`
//! tag identifies the subject, so a newer attestation about the same
//! subject from the same attestor replaces the older one.
//!
//! ```text
//! types.rs        — AttestationKind, AttestationSecret, AttestationBundle, Disclosure
//! builder.rs      — Attestation → unsigned event (public or private)
//! verification.rs — ordered structural checks, no decryption
//! disclosure.rs   — read public claims, open private ones
//! ```
//!
//! A **public** attestation spells its claims out in tags. A **private**
//! one encrypts them and replaces the `d` tag with a pseudonym, so only
//! holders of the secret can tell who it's about.

pub mod builder;
pub mod disclosure;
pub mod types;
pub mod verification;

pub use builder::Attestation;
pub use disclosure::{open_private_attestation, read_public_attestation};
pub use types::{AttestationBundle, AttestationKind, AttestationSecret, Disclosure};
pub use verification::{
    validate_attestation, validate_key_migration_attestation, validate_recovery_keys_attestation,
};
