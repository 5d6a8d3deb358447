//! Error taxonomy for builders, validators and verifiers.
//!
//! Four families, one per failure mode a caller can actually act on:
//!
//! - [`ProtocolError::Input`]: a builder or primitive was handed garbage
//!   (bad hex, wrong-length key, zero threshold). Fix the call site.
//! - [`ProtocolError::Structural`]: an event doesn't have the tag shape its
//!   kind requires. Reject the event. The [`ValidationError`] code says why.
//! - [`ProtocolError::Crypto`]: signing, encryption or decryption failed.
//! - [`ProtocolError::Format`]: bytes that should be base64 or JSON aren't.
//!
//! Validators return exactly one error per malformed event: the first
//! failing check in their documented order.

use thiserror::Error;

use crate::config::Safeguard;
use crate::crypto::{EncryptionError, KeyError, SignatureError};

/// Convenience alias used across the crate.
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level error for every public operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("structural validation failed: {0}")]
    Structural(#[from] ValidationError),

    #[error("cryptographic failure: {0}")]
    Crypto(String),

    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

impl ProtocolError {
    /// Shorthand for the most common builder failure.
    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Stable, machine-readable code. Handy for CLIs and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Structural(err) => err.code(),
            Self::Crypto(_) => "crypto",
            Self::Format(err) => err.code(),
        }
    }

    /// The structural code, if this is a structural failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Structural(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EncryptionError> for ProtocolError {
    fn from(err: EncryptionError) -> Self {
        Self::Crypto(err.to_string())
    }
}

impl From<KeyError> for ProtocolError {
    fn from(err: KeyError) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<SignatureError> for ProtocolError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidSecretKey => Self::Crypto(err.to_string()),
            SignatureError::InvalidPublicKey | SignatureError::InvalidSignature => {
                Self::Input(err.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Structural validation codes.
///
/// Each variant maps to one rule of one validator. Messages name the tag
/// involved but never echo tag values back.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid kind: expected {expected}, got {got}")]
    InvalidKind { expected: u16, got: u16 },

    #[error("must include exactly one `{0}` safeguard tag")]
    MissingOrDuplicateSafeguard(Safeguard),

    #[error("safeguard `{0}` must not carry a value")]
    SafeguardHasValue(Safeguard),

    #[error("must include exactly one `threshold` tag")]
    MissingOrDuplicateThreshold,

    #[error("`threshold` tag must carry exactly one base-10 integer")]
    ThresholdMalformed,

    #[error("`threshold` must be a positive integer")]
    ThresholdNotPositive,

    #[error("must include one or more guardian `p` tags")]
    NoGuardianKeys,

    #[error("must include at most one `new-key` tag")]
    TooManyNewKeys,

    #[error("must include at most one `successor-key` tag")]
    TooManySuccessorKeys,

    #[error("migration must reference exactly one recovery setup with an `e` tag")]
    MissingOrDuplicateReference,

    #[error("migration and revocation safeguards are mutually exclusive")]
    ConflictingSafeguards,

    #[error("must include exactly one `d` tag")]
    MissingOrDuplicateIdentifier,

    #[error("private attestation must not include public tags")]
    PrivateLeaksPublicTags,

    #[error("public attestation must include `p`, `e` and payload tags")]
    PublicMissingTags,

    #[error("event has no author public key")]
    MissingAuthorKey,

    #[error("migration references a different recovery setup")]
    SetupReferenceMismatch,

    #[error("`d` tag does not match the disclosed subject")]
    IdentifierMismatch,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidKind { .. } => "invalid_kind",
            Self::MissingOrDuplicateSafeguard(_) => "missing_or_duplicate_safeguard",
            Self::SafeguardHasValue(_) => "safeguard_has_value",
            Self::MissingOrDuplicateThreshold => "missing_or_duplicate_threshold",
            Self::ThresholdMalformed => "threshold_malformed",
            Self::ThresholdNotPositive => "threshold_not_positive",
            Self::NoGuardianKeys => "no_guardian_keys",
            Self::TooManyNewKeys => "too_many_new_keys",
            Self::TooManySuccessorKeys => "too_many_successor_keys",
            Self::MissingOrDuplicateReference => "missing_or_duplicate_reference",
            Self::ConflictingSafeguards => "conflicting_safeguards",
            Self::MissingOrDuplicateIdentifier => "missing_or_duplicate_identifier",
            Self::PrivateLeaksPublicTags => "private_leaks_public_tags",
            Self::PublicMissingTags => "public_missing_tags",
            Self::MissingAuthorKey => "missing_author_key",
            Self::SetupReferenceMismatch => "setup_reference_mismatch",
            Self::IdentifierMismatch => "identifier_mismatch",
        }
    }
}

// ---------------------------------------------------------------------------
// FormatError
// ---------------------------------------------------------------------------

/// Encoding failures in event content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("private content must be standard base64")]
    ContentNotBase64,

    #[error("decrypted payload is not a JSON tag array: {0}")]
    PayloadNotJson(String),

    #[error("event is not valid JSON: {0}")]
    EventNotJson(String),
}

impl FormatError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContentNotBase64 => "content_not_base64",
            Self::PayloadNotJson(_) => "payload_not_json",
            Self::EventNotJson(_) => "event_not_json",
        }
    }
}
