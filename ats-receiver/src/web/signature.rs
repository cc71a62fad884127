//! ATS webhook signature computation and verification.
//!
//! The hub signs each request body with HMAC-SHA256 keyed by the shared
//! secret and sends the digest in `X-ATS-Signature` as `sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix carried by compliant senders in the signature header.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the lower-case hex HMAC-SHA256 of `payload` keyed by `secret`.
pub fn compute_signature(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Build the canonical `sha256=<hex>` header value for `payload`.
pub fn signature_header_value(payload: &[u8], secret: &str) -> String {
    format!("{}{}", SIGNATURE_PREFIX, compute_signature(payload, secret))
}

/// Verify an `X-ATS-Signature` header value against the raw request body.
///
/// The provided value may carry the `sha256=` prefix in any case and
/// surrounding whitespace. Anything that does not decode as hex is a
/// failed verification, never an error.
pub fn verify_signature(provided: &str, payload: &[u8], secret: &str) -> bool {
    let provided = normalize_signature(provided);
    let expected = compute_signature(payload, secret);

    secure_equals_hex(&provided, &expected)
}

/// Strip whitespace and the optional `sha256=` prefix, then lower-case.
fn normalize_signature(signature: &str) -> String {
    let trimmed = signature.trim();
    let unprefixed = match trimmed.get(..SIGNATURE_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(SIGNATURE_PREFIX) => {
            &trimmed[SIGNATURE_PREFIX.len()..]
        }
        _ => trimmed,
    };

    unprefixed.trim().to_ascii_lowercase()
}

/// Length check, then a fixed-time comparison of the decoded bytes.
fn secure_equals_hex(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }

    match (hex::decode(left), hex::decode(right)) {
        (Ok(left), Ok(right)) => left.ct_eq(&right).into(),
        _ => false,
    }
}
