//! API key generation and lookup hashing.
//!
//! Raw API keys are high-entropy random values (256 bits by default), so a
//! single fast SHA-256 pass is the right hash for them: it is one-way and
//! deterministic, which is all an equality lookup needs. Brute-force
//! resistance comes from the entropy of the input, not from a slow hash;
//! that is what [`crate::security::password`] is for.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of leading characters of a raw key kept as its display prefix.
pub const KEY_PREFIX_LEN: usize = 8;

/// Default entropy for generated keys and secrets, in bytes.
pub const DEFAULT_KEY_BYTES: usize = 32;

/// Generate a cryptographically random hex-encoded key.
///
/// `byte_len` of zero is normalized to [`DEFAULT_KEY_BYTES`]. The returned
/// value is the only copy of the raw key that will ever exist; callers hash
/// it before persistence.
pub fn generate_api_key(byte_len: usize) -> String {
    let len = if byte_len == 0 {
        DEFAULT_KEY_BYTES
    } else {
        byte_len
    };
    let mut buf = vec![0u8; len];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// SHA-256 hash of a raw API key, hex-encoded (64 chars).
///
/// This is the value stored in `api_keys.key_hash` and computed again on
/// every authenticated request for lookup.
pub fn hash_api_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short non-secret prefix of a raw key, used for display after creation.
pub fn key_prefix(raw_key: &str) -> &str {
    &raw_key[..KEY_PREFIX_LEN.min(raw_key.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_hex_of_requested_length() {
        let key = generate_api_key(32);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn zero_length_falls_back_to_default() {
        assert_eq!(generate_api_key(0).len(), DEFAULT_KEY_BYTES * 2);
    }

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(generate_api_key(32), generate_api_key(32));
    }

    #[test]
    fn hash_is_deterministic_and_fixed_length() {
        let a = hash_api_key("abc123");
        let b = hash_api_key("abc123");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_api_key("abc124"));
    }

    #[test]
    fn hash_is_not_the_key() {
        let key = generate_api_key(32);
        assert_ne!(hash_api_key(&key), key);
    }

    #[test]
    fn prefix_is_first_eight_chars() {
        assert_eq!(key_prefix("abcdef0123456789"), "abcdef01");
        assert_eq!(key_prefix("abc"), "abc");
    }
}
