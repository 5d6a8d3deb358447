//! The signed event: the only durable artifact in the protocol.
//!
//! Builders produce an [`Event`], authors sign it, guardians co-sign it,
//! and relying parties validate it. Nothing else persists.
//!
//! # Canonical serialization
//!
//! The id is `hex(sha256(json))` over the compact JSON array
//!
//! ```text
//! [0, pubkey, created_at, kind, tags, content]
//! ```
//!
//! `id` and `sig` are excluded, so the id is stable across signing, and
//! every implementation that agrees on this array agrees on the id.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tag::Tags;
use crate::config::EventKind;
use crate::crypto::hash::{sha256_array, sha256_hex};
use crate::crypto::keys::Keypair;
use crate::crypto::signatures::{sign_digest, verify_hex};
use crate::error::{FormatError, ProtocolError, Result};

/// Current unix time in seconds, the unit `created_at` uses.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// A signed (or not yet signed) event.
///
/// Field order matches the wire JSON: `kind, id, pubkey, created_at, tags,
/// content, sig`. An unsigned event simply has empty `id` and `sig`, and
/// those are omitted when serializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: u16,

    /// `hex(sha256(canonical))`. Empty until signed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Author public key, 64 hex chars. Builders for author-bound kinds set
    /// it; attestation builders leave it for [`Event::sign`] to fill.
    #[serde(default)]
    pub pubkey: String,

    /// Unix seconds.
    pub created_at: i64,

    #[serde(default)]
    pub tags: Tags,

    #[serde(default)]
    pub content: String,

    /// Author signature over the id. Empty until signed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sig: String,
}

impl Event {
    /// An empty event of the given kind.
    pub fn new(kind: EventKind, created_at: i64) -> Self {
        Self {
            kind: kind.as_u16(),
            id: String::new(),
            pubkey: String::new(),
            created_at,
            tags: Tags::new(),
            content: String::new(),
            sig: String::new(),
        }
    }

    /// The catalog kind, if this is one of ours.
    pub fn event_kind(&self) -> Option<EventKind> {
        EventKind::from_u16(self.kind)
    }

    /// The canonical serialization the id and every signature cover.
    pub fn canonical_json(&self) -> String {
        let tags = self
            .tags
            .iter()
            .map(|tag| Value::Array(tag.to_vec().into_iter().map(Value::String).collect()))
            .collect();
        Value::Array(vec![
            Value::from(0),
            Value::String(self.pubkey.clone()),
            Value::from(self.created_at),
            Value::from(self.kind),
            Value::Array(tags),
            Value::String(self.content.clone()),
        ])
        .to_string()
    }

    /// SHA-256 of [`Event::canonical_json`].
    pub fn digest(&self) -> [u8; 32] {
        sha256_array(self.canonical_json().as_bytes())
    }

    /// `hex(digest)`, what `id` should be.
    pub fn compute_id(&self) -> String {
        sha256_hex(self.canonical_json().as_bytes())
    }

    /// Sign as the author.
    ///
    /// Sets `pubkey` (if empty), then `id` and `sig`. Refuses to sign an
    /// event that already names a different author: that would produce a
    /// perfectly valid signature by the wrong identity.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<()> {
        let author = keypair.public_key_hex();
        if !self.pubkey.is_empty() && self.pubkey != author {
            return Err(ProtocolError::input(
                "event pubkey does not match the signing key",
            ));
        }
        self.pubkey = author;
        let digest = self.digest();
        self.id = hex::encode(digest);
        self.sig = sign_digest(keypair, &digest).to_hex();
        tracing::debug!(kind = self.kind, id = %self.id, "event signed");
        Ok(())
    }

    /// Check the author signature.
    ///
    /// `Ok(false)` when the id doesn't match the content or the signature
    /// doesn't verify; `Err` when `pubkey` or `sig` aren't even well-formed.
    pub fn verify_signature(&self) -> Result<bool> {
        let digest = self.digest();
        if self.id != hex::encode(digest) {
            return Ok(false);
        }
        Ok(verify_hex(&self.pubkey, &digest, &self.sig)?)
    }

    pub fn is_signed(&self) -> bool {
        !self.sig.is_empty()
    }

    /// Wire JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| FormatError::EventNotJson(e.to_string()).into())
    }

    /// Parse wire JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FormatError::EventNotJson(e.to_string()).into())
    }
}
