//! Gateway signature computation and verification.
//!
//! The gateway binds a fixed set of named fields with a salted SHA-512
//! digest. The request side joins `name=value` pairs with `&`; the response
//! side joins them with `|`. The asymmetry is part of the gateway's wire
//! contract and must not be "fixed".
//!
//! Verification fails closed: any missing or malformed input yields `false`,
//! never an error, and the caller then treats the payment as unverified.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use sha2::{Digest, Sha512};

/// Compute the hex-encoded SHA-512 of `payload|salt`.
fn salted_sha512_hex(payload: &str, salt: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(payload.as_bytes());
    hasher.update(b"|");
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the signature for an outbound payment-link request.
///
/// Field names are sorted lexicographically (the `BTreeMap` ordering),
/// joined as `name=value` pairs with `&`, then hashed as `payload|salt`.
#[must_use]
pub fn payment_request_hash(fields: &BTreeMap<String, String>, salt: &str) -> String {
    let payload = fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    salted_sha512_hex(&payload, salt)
}

/// Compute the signature the gateway applies to callback fields.
///
/// Same construction as [`payment_request_hash`] except pairs are joined
/// with `|`, matching the gateway's response-side convention.
#[must_use]
pub fn callback_hash(fields: &BTreeMap<String, String>, salt: &str) -> String {
    let payload = fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("|");
    salted_sha512_hex(&payload, salt)
}

/// Verify the signature on a set of callback fields.
///
/// Extracts the `hash` field, recomputes the callback hash over the
/// remaining fields, and compares in constant time. Returns `false` when
/// the `hash` field is absent.
#[must_use]
pub fn verify_callback<S: BuildHasher>(fields: &HashMap<String, String, S>, salt: &str) -> bool {
    let Some(received) = fields.get("hash") else {
        return false;
    };

    let remaining: BTreeMap<String, String> = fields
        .iter()
        .filter(|(name, _)| name.as_str() != "hash")
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let expected = callback_hash(&remaining, salt);
    constant_time_eq(&expected, received)
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_fields() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("txn_id".to_string(), "TXN_abc_1".to_string()),
            ("amount".to_string(), "500".to_string()),
            ("status".to_string(), "success".to_string()),
        ])
    }

    #[test]
    fn request_hash_is_deterministic() {
        let fields = sample_fields();
        assert_eq!(
            payment_request_hash(&fields, "salt"),
            payment_request_hash(&fields, "salt")
        );
    }

    #[test]
    fn request_hash_produces_sha512_hex() {
        let hash = payment_request_hash(&sample_fields(), "salt");
        assert_eq!(hash.len(), 128); // SHA-512 = 64 bytes = 128 hex chars
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn request_hash_depends_on_salt_and_values() {
        let fields = sample_fields();
        let base = payment_request_hash(&fields, "salt");
        assert_ne!(base, payment_request_hash(&fields, "other-salt"));

        let mut mutated = fields;
        mutated.insert("amount".to_string(), "501".to_string());
        assert_ne!(base, payment_request_hash(&mutated, "salt"));
    }

    #[test]
    fn request_and_callback_conventions_differ() {
        let fields = sample_fields();
        assert_ne!(
            payment_request_hash(&fields, "salt"),
            callback_hash(&fields, "salt")
        );
    }

    #[test]
    fn callback_roundtrip_verifies() {
        let fields = sample_fields();
        let hash = callback_hash(&fields, "salt");

        let mut response: HashMap<String, String> = fields.into_iter().collect();
        response.insert("hash".to_string(), hash);

        assert!(verify_callback(&response, "salt"));
    }

    #[test]
    fn tampered_field_fails_verification() {
        let fields = sample_fields();
        let hash = callback_hash(&fields, "salt");

        let mut response: HashMap<String, String> = fields.into_iter().collect();
        response.insert("hash".to_string(), hash);
        response.insert("amount".to_string(), "99999".to_string());

        assert!(!verify_callback(&response, "salt"));
    }

    #[test]
    fn wrong_salt_fails_verification() {
        let fields = sample_fields();
        let hash = callback_hash(&fields, "salt");

        let mut response: HashMap<String, String> = fields.into_iter().collect();
        response.insert("hash".to_string(), hash);

        assert!(!verify_callback(&response, "different"));
    }

    #[test]
    fn missing_hash_field_is_false_not_error() {
        let response: HashMap<String, String> = sample_fields().into_iter().collect();
        assert!(!verify_callback(&response, "salt"));

        let empty: HashMap<String, String> = HashMap::new();
        assert!(!verify_callback(&empty, "salt"));
    }

    #[test]
    fn constant_time_eq_basic() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("abc", "ABC"));
    }
}
