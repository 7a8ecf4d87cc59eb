//! Cryptographic primitives for the credential core.
//!
//! Everything here is a pure function of its inputs plus the process-wide
//! secrets loaded at startup; no module holds mutable state.

/// AES-256-GCM encryption for secrets at rest
pub mod cipher;
/// API key generation and lookup hashing
pub mod keys;
/// Argon2id password hashing
pub mod password;
/// HMAC verification for inbound webhooks and OAuth callbacks
pub mod webhook;

pub use cipher::{CipherError, SecretCipher};
