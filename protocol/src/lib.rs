// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Keyward Protocol — Core Library
//!
//! Keys get lost. Keys get stolen. Keyward is the part of an identity
//! protocol that deals with it: signed events that retire a key, name its
//! successor, and let a circle of guardians vouch for the move.
//!
//! Everything here is a pure function over events. No network, no storage,
//! no opinions about which relay you trust. You build an event, you sign
//! it, somebody else validates it.
//!
//! ## Architecture
//!
//! - **config** — Event kinds, safeguard tags, crypto parameters.
//! - **crypto** — Ed25519, SHA-256, and salted ChaCha20/HMAC encryption.
//! - **event** — The signed event envelope and its typed tags.
//! - **identity** — Key-shaped input checks and attestation pseudonyms.
//! - **recovery** — Guardian setups (kind 51) and quorum evaluation.
//! - **migration** — Key migration and revocation (kind 50).
//! - **cosign** — Guardian co-signatures on migrations.
//! - **attestation** — Third-party attestations (kinds 30050, 30051).
//! - **error** — One error type with four families.
//!
//! ## Quick tour
//!
//! ```
//! use keyward_protocol::prelude::*;
//!
//! let alice = Keypair::generate();
//! let guardians: Vec<Keypair> = (0..3).map(|_| Keypair::generate()).collect();
//!
//! // Alice registers three guardians, any two of which can approve.
//! let mut setup = RecoveryKeysSetup::new(guardians.iter().map(Keypair::public_key_hex), 2, "")
//!     .to_event(1_000)
//!     .unwrap();
//! setup.sign(&alice).unwrap();
//!
//! // Alice moves to a new key; two guardians co-sign.
//! let fresh = Keypair::generate();
//! let migration = KeyMigrationAndRevocation::migration(
//!     alice.public_key_hex(),
//!     fresh.public_key_hex(),
//!     setup.id.clone(),
//!     "new phone",
//! )
//! .to_event(2_000)
//! .unwrap();
//! let sigs = guardians[..2]
//!     .iter()
//!     .map(|g| sign_co_signature(&migration, &g.secret_key_hex()))
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! let migration = attach_co_signatures(migration, sigs);
//!
//! assert!(evaluate_quorum(&migration, &setup).unwrap().is_satisfied());
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Validators judge shape. Crypto checks are separate, explicit calls.
//! 2. One error per bad event: the first failing rule, in documented order.
//! 3. Secrets are zeroized and never logged.

pub mod attestation;
pub mod config;
pub mod cosign;
pub mod crypto;
pub mod error;
pub mod event;
pub mod identity;
pub mod migration;
pub mod recovery;
mod validation;

pub use error::{FormatError, ProtocolError, Result, ValidationError};

/// The types and functions most callers need.
pub mod prelude {
    pub use crate::attestation::{
        open_private_attestation, read_public_attestation, validate_attestation, Attestation,
        AttestationBundle, AttestationKind, AttestationSecret, Disclosure,
    };
    pub use crate::config::{EventKind, Safeguard};
    pub use crate::cosign::{
        attach_co_signatures, co_signatures, sign_co_signature, verify_co_signature,
    };
    pub use crate::crypto::keys::Keypair;
    pub use crate::error::{ProtocolError, ValidationError};
    pub use crate::event::{Event, Tag, Tags};
    pub use crate::identity::derive_attestation_identifier;
    pub use crate::migration::{validate_key_migration_and_revocation, KeyMigrationAndRevocation};
    pub use crate::recovery::{
        evaluate_quorum, validate_recovery_keys_setup, QuorumReport, RecoveryKeysSetup,
    };
}
