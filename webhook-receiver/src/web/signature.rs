//! HubSpot webhook signature verification.
//!
//! HubSpot signs each request with HMAC-SHA256 keyed by the app's client
//! secret. The signed message is the request method, path and raw body
//! concatenated with no delimiter. The tag arrives as lowercase hex in the
//! `X-HubSpot-Signature` header.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-HubSpot-Signature";

/// Compute the expected signature for a request.
///
/// Returns the lowercase hex encoding of
/// `HMAC-SHA256(secret, method ++ path ++ body)`.
pub fn compute_signature(
    secret: &str,
    method: &str,
    path: &str,
    body: &[u8],
) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;

    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body);

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a HubSpot webhook signature.
///
/// # Arguments
///
/// * `signature` - Value of the `X-HubSpot-Signature` header (empty if absent)
/// * `secret` - The app's client secret
/// * `method` - Request method, e.g. `POST`
/// * `path` - Request path without the query string
/// * `body` - Raw request body
///
/// # Returns
///
/// `true` if the signature equals the expected hex tag byte-for-byte.
/// The comparison runs in constant time.
pub fn verify_signature(
    signature: &str,
    secret: &str,
    method: &str,
    path: &str,
    body: &[u8],
) -> bool {
    let expected = match compute_signature(secret, method, path, body) {
        Ok(sig) => sig,
        Err(_) => {
            warn!("hubspot_signature_invalid_key");
            return false;
        }
    };

    let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();

    if !valid {
        debug!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "hubspot_signature_mismatch"
        );
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_signature(secret: &str, message: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_valid() {
        let signature = reference_signature("abc123", b"POST/hubspot-webhook{}");
        assert!(verify_signature(
            &signature,
            "abc123",
            "POST",
            "/hubspot-webhook",
            b"{}"
        ));
    }

    #[test]
    fn test_compute_signature_is_lowercase_hex() {
        let signature =
            compute_signature("abc123", "POST", "/hubspot-webhook", b"{}").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(
            signature,
            reference_signature("abc123", b"POST/hubspot-webhook{}")
        );
    }

    #[test]
    fn test_known_vector() {
        // Well-known HMAC-SHA256 vector, split across the three inputs.
        let signature =
            compute_signature("key", "The quick brown fox ", "jumps over ", b"the lazy dog")
                .unwrap();
        assert_eq!(
            signature,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_verify_signature_uppercase_rejected() {
        let signature =
            compute_signature("abc123", "POST", "/hubspot-webhook", b"{}").unwrap();
        assert!(!verify_signature(
            &signature.to_uppercase(),
            "abc123",
            "POST",
            "/hubspot-webhook",
            b"{}"
        ));
    }

    #[test]
    fn test_verify_signature_tampered_inputs() {
        let path = "/hubspot-webhook";
        let body = b"{\"id\":1}";
        let signature = compute_signature("abc123", "POST", path, body).unwrap();

        assert!(!verify_signature(&signature, "abc123", "POST", path, b"{\"id\":2}"));
        assert!(!verify_signature(&signature, "abc123", "PUT", path, body));
        assert!(!verify_signature(&signature, "abc123", "POST", "/hubspot-webhooK", body));
        assert!(!verify_signature(&signature, "abc124", "POST", path, body));
    }

    #[test]
    fn test_verify_signature_every_body_byte_matters() {
        let body = b"{\"objectId\":1246965,\"propertyName\":\"lifecyclestage\"}".to_vec();
        let signature = compute_signature("secret", "POST", "/hubspot-webhook", &body).unwrap();

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert!(
                !verify_signature(
                    &signature,
                    "secret",
                    "POST",
                    "/hubspot-webhook",
                    &tampered
                ),
                "flipping byte {i} went unnoticed"
            );
        }
    }

    #[test]
    fn test_verify_signature_missing_or_truncated() {
        let signature =
            compute_signature("abc123", "POST", "/hubspot-webhook", b"{}").unwrap();
        assert!(!verify_signature("", "abc123", "POST", "/hubspot-webhook", b"{}"));
        assert!(!verify_signature(
            &signature[..63],
            "abc123",
            "POST",
            "/hubspot-webhook",
            b"{}"
        ));
        assert!(!verify_signature(
            &format!("{signature}0"),
            "abc123",
            "POST",
            "/hubspot-webhook",
            b"{}"
        ));
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let signature = compute_signature("", "POST", "/hubspot-webhook", b"").unwrap();
        assert!(verify_signature(&signature, "", "POST", "/hubspot-webhook", b""));
    }
}
