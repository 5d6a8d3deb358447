//! # Social Recovery
//!
//! Lost your key? Your friends have your back, as long as enough of them
//! agree.
//!
//! - **setup** — register guardian keys and a threshold (kind 51).
//! - **quorum** — count valid guardian co-signatures on a migration.
//!
//! Guardians never hold any share of the subject's secret. They vouch for a
//! *successor* key by co-signing the migration event; the old key is simply
//! abandoned.

pub mod quorum;
pub mod setup;

pub use quorum::{evaluate_quorum, QuorumReport};
pub use setup::{validate_recovery_keys_setup, RecoveryKeysSetup, MAX_THRESHOLD};
