//! # Migration Module
//!
//! Key migration and revocation (kind 50).
//!
//! ```text
//! builder.rs      — KeyMigrationAndRevocation → unsigned event, and back
//! verification.rs — ordered structural checks
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** — [`KeyMigrationAndRevocation::migration`] or
//!    [`KeyMigrationAndRevocation::revocation`], then `to_event`.
//! 2. **Co-sign** — guardians sign with [`crate::cosign::sign_co_signature`];
//!    signatures are attached as a `sigs` tag.
//! 3. **Sign** — the subject signs with [`crate::event::Event::sign`].
//! 4. **Validate** — [`validate_key_migration_and_revocation`], then
//!    [`crate::recovery::evaluate_quorum`] against the referenced setup.

pub mod builder;
pub mod verification;

pub use builder::KeyMigrationAndRevocation;
pub use verification::validate_key_migration_and_revocation;
