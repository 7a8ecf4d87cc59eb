//! Authenticated encryption for values at rest.
//!
//! Third-party access tokens are encrypted with AES-256-GCM before they
//! reach the database. A fresh random 96-bit nonce is generated for every
//! encryption and prepended to the ciphertext, so a stored blob is fully
//! self-describing: decryption needs only the blob and the process key.
//!
//! Decryption failures are deliberately opaque. Wrong key, truncated blob,
//! and tampered ciphertext all produce the same [`CipherError::Decrypt`];
//! distinguishing them would hand an oracle to an attacker.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};

/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// Failures from the secret cipher.
///
/// `Decrypt` intentionally carries no detail.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,
}

/// Symmetric cipher for secrets at rest, keyed once at process start.
///
/// Cheap to clone; the key is a fixed-length array loaded from
/// `ENCRYPTION_KEY` and never derived from user input.
#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; 32],
}

impl SecretCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext`, returning `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CipherError::Encrypt)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypt a blob produced by [`SecretCipher::encrypt`].
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CipherError> {
        if blob.len() < NONCE_LEN {
            return Err(CipherError::Decrypt);
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decrypt)
    }

    /// Encrypt a string and hex-encode the blob for TEXT column storage.
    pub fn encrypt_to_hex(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        Ok(hex::encode(self.encrypt(plaintext.as_bytes())?))
    }

    /// Decrypt a hex-encoded blob back into a string.
    ///
    /// `allow_legacy_plaintext` is a narrow migration shim: only when it is
    /// set, a stored value that does not hex-decode is returned unchanged
    /// (pre-encryption rows). A value that hex-decodes but fails
    /// authenticated decryption always errors, flag or not.
    pub fn decrypt_from_hex(
        &self,
        stored: &str,
        allow_legacy_plaintext: bool,
    ) -> Result<String, CipherError> {
        if stored.is_empty() {
            return Ok(String::new());
        }

        let blob = match hex::decode(stored) {
            Ok(blob) => blob,
            Err(_) if allow_legacy_plaintext => return Ok(stored.to_string()),
            Err(_) => return Err(CipherError::Decrypt),
        };

        let plaintext = self.decrypt(&blob)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> SecretCipher {
        SecretCipher::new([7u8; 32])
    }

    #[test]
    fn round_trip() {
        let c = cipher();
        let blob = c.encrypt(b"shpat_secret_token").unwrap();
        assert_eq!(c.decrypt(&blob).unwrap(), b"shpat_secret_token");
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let c = cipher();
        let a = c.encrypt(b"same input").unwrap();
        let b = c.encrypt(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let blob = cipher().encrypt(b"secret").unwrap();
        let other = SecretCipher::new([8u8; 32]);
        assert_eq!(other.decrypt(&blob), Err(CipherError::Decrypt));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let c = cipher();
        let mut blob = c.encrypt(b"secret").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert_eq!(c.decrypt(&blob), Err(CipherError::Decrypt));
    }

    #[test]
    fn truncated_blob_fails() {
        assert_eq!(cipher().decrypt(&[0u8; 5]), Err(CipherError::Decrypt));
    }

    #[test]
    fn hex_round_trip() {
        let c = cipher();
        let stored = c.encrypt_to_hex("shpat_abc123").unwrap();
        assert_eq!(c.decrypt_from_hex(&stored, false).unwrap(), "shpat_abc123");
    }

    #[test]
    fn legacy_plaintext_only_behind_flag() {
        let c = cipher();
        // Not valid hex, so it cannot be one of our blobs.
        let legacy = "shpat_plaintext_token";
        assert_eq!(c.decrypt_from_hex(legacy, true).unwrap(), legacy);
        assert_eq!(c.decrypt_from_hex(legacy, false), Err(CipherError::Decrypt));
    }

    #[test]
    fn legacy_flag_never_forgives_bad_ciphertext() {
        let c = cipher();
        // Valid hex that is not an authentic blob must fail even with the
        // migration flag set.
        let forged = hex::encode([0u8; 32]);
        assert_eq!(c.decrypt_from_hex(&forged, true), Err(CipherError::Decrypt));
    }

    #[test]
    fn empty_values_pass_through() {
        let c = cipher();
        assert_eq!(c.encrypt_to_hex("").unwrap(), "");
        assert_eq!(c.decrypt_from_hex("", false).unwrap(), "");
    }
}
