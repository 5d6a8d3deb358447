//! # Cryptographic Primitives for Keyward
//!
//! Every event id, every author signature, every guardian co-signature and
//! every private attestation flows through here.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **Ed25519** for signatures. Deterministic, and nobody has broken it.
//! - **SHA-256** for digests, because that's what event ids are.
//! - **ChaCha20 + HMAC-SHA256** (keys via HKDF) for private attestations.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. The one place we assemble primitives ourselves is the
//! salted payload format in [`encryption`], and that follows a published
//! layout byte for byte.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use encryption::{decrypt, encrypt, EncryptionError};
pub use hash::{sha256, sha256_array, sha256_hex};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
pub use signatures::{sign_digest, sign_digest_hex, verify_digest, verify_hex, SignatureError};
