//! Identifier types for coursepay.
//!
//! `UserId` is the opaque identifier handed out by the identity provider.
//! `TxnId` is the ledger/gateway transaction identifier: it combines the user
//! id with a strictly monotonic millisecond component so that two top-ups by
//! the same user can never collide within a process.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A user identifier (UUID, from the identity provider's `sub` claim).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(uuid::Uuid);

impl UserId {
    /// Create a `UserId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier (primarily for testing).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the bytes of the UUID (16 bytes).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0.to_string()
    }
}

impl AsRef<[u8]> for UserId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Last millisecond value handed out by [`TxnId::generate`].
static LAST_TXN_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Hand out a millisecond timestamp that is strictly greater than every
/// previously handed-out value in this process.
fn next_txn_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_TXN_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_TXN_MILLIS.compare_exchange_weak(
            last,
            next,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// A ledger transaction identifier, rendered as `TXN_<user-uuid>_<millis>`.
///
/// The same string is used as the gateway-facing `txn_id`, so one identifier
/// links the local ledger entry and the gateway's records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxnId {
    user_id: UserId,
    millis: i64,
}

impl TxnId {
    /// Generate a new transaction id for a user with a monotonic time component.
    #[must_use]
    pub fn generate(user_id: UserId) -> Self {
        Self {
            user_id,
            millis: next_txn_millis(),
        }
    }

    /// Build a transaction id from its parts (used when decoding index keys).
    #[must_use]
    pub const fn from_parts(user_id: UserId, millis: i64) -> Self {
        Self { user_id, millis }
    }

    /// The user this transaction belongs to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The millisecond time component.
    #[must_use]
    pub const fn millis(&self) -> i64 {
        self.millis
    }
}

impl FromStr for TxnId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("TXN_").ok_or(IdError::InvalidTxnId)?;
        // The UUID part is fixed-width (36 chars with hyphens).
        if !rest.is_char_boundary(36) || rest.len() < 36 {
            return Err(IdError::InvalidTxnId);
        }
        let (user_part, millis_part) = rest.split_at(36);
        let millis_part = millis_part.strip_prefix('_').ok_or(IdError::InvalidTxnId)?;

        let user_id = user_part.parse::<UserId>()?;
        let millis = millis_part.parse::<i64>().map_err(|_| IdError::InvalidTxnId)?;
        if millis < 0 {
            return Err(IdError::InvalidTxnId);
        }

        Ok(Self { user_id, millis })
    }
}

impl fmt::Debug for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxnId(TXN_{}_{})", self.user_id, self.millis)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TXN_{}_{}", self.user_id, self.millis)
    }
}

impl TryFrom<String> for TxnId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TxnId> for String {
    fn from(id: TxnId) -> Self {
        id.to_string()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid transaction id.
    #[error("invalid transaction id format")]
    InvalidTxnId,
}
