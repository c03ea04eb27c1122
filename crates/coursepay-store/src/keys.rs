//! Key encoding utilities for `RocksDB`.

use coursepay_core::{TxnId, UserId};

/// Create a wallet key from a user ID.
#[must_use]
pub fn wallet_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a top-up ledger key from a transaction ID.
#[must_use]
pub fn topup_key(txn_id: &TxnId) -> Vec<u8> {
    txn_id.to_string().into_bytes()
}

/// Create a user-topup index key.
///
/// Format: `user_id (16 bytes) || millis (8 bytes big-endian)`
///
/// The millisecond component is strictly monotonic per user, so entries sort
/// chronologically and never collide.
#[must_use]
pub fn user_topup_key(txn_id: &TxnId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(txn_id.user_id().as_bytes());
    key.extend_from_slice(&txn_id.millis().to_be_bytes());
    key
}

/// Create a prefix for iterating all top-ups for a user.
#[must_use]
pub fn user_topups_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Reconstruct the transaction ID from a user-topup index key.
///
/// # Panics
///
/// Panics if the key is not exactly 24 bytes.
#[must_use]
pub fn txn_id_from_index_key(key: &[u8]) -> TxnId {
    assert_eq!(key.len(), 24, "malformed user-topup index key");
    let mut uuid_bytes = [0u8; 16];
    uuid_bytes.copy_from_slice(&key[..16]);
    let mut millis_bytes = [0u8; 8];
    millis_bytes.copy_from_slice(&key[16..24]);

    let user_id = UserId::from_uuid(uuid::Uuid::from_bytes(uuid_bytes));
    TxnId::from_parts(user_id, i64::from_be_bytes(millis_bytes))
}

/// Create an enrollment key from a user ID and course slug.
///
/// Format: `user_id (16 bytes) || course_slug (UTF-8)`
#[must_use]
pub fn enrollment_key(user_id: &UserId, course_slug: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(16 + course_slug.len());
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(course_slug.as_bytes());
    key
}

/// Create a prefix for iterating all enrollments for a user.
#[must_use]
pub fn user_enrollments_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}
