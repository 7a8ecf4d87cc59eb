//! HMAC verification for inbound webhooks and OAuth callbacks.
//!
//! Webhook signatures cover the exact bytes of the request body as
//! received. Re-serializing the payload (different key ordering, different
//! whitespace) produces a different MAC, so verification must happen before
//! any JSON parsing. All comparisons are constant-time.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify an inbound webhook signature.
///
/// Computes HMAC-SHA256 over `body` with the tenant's shared secret and
/// compares the base64 encoding against `provided` in constant time.
/// Missing or undecodable signatures simply fail; there is no partial trust.
pub fn verify_webhook_signature(secret: &str, body: &[u8], provided: &str) -> bool {
    if provided.is_empty() {
        return false;
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Verify the `hmac` parameter on an OAuth callback.
///
/// The message is the sorted `key=value` query pairs joined with `&`,
/// excluding the `hmac` and `signature` parameters themselves; the digest
/// is hex-encoded per the platform's convention.
pub fn verify_callback_hmac(secret: &str, params: &[(String, String)]) -> bool {
    let Some((_, provided)) = params.iter().find(|(k, _)| k == "hmac") else {
        return false;
    };

    let mut pairs: Vec<String> = params
        .iter()
        .filter(|(k, _)| k != "hmac" && k != "signature")
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    pairs.sort();
    let message = pairs.join("&");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(message.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
