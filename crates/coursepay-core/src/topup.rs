//! Top-up ledger transaction types.
//!
//! Every top-up attempt creates a ledger entry before the gateway is
//! contacted, so a dropped outbound call still leaves an auditable record.
//! Entries are append-mostly: the only mutation after creation is the single
//! pending-to-terminal status transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TxnId, UserId};

/// A top-up transaction in the durable payment ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopupTransaction {
    /// Unique transaction id, shared with the gateway as `txn_id`.
    pub id: TxnId,

    /// The user whose wallet this top-up targets. Immutable.
    pub user_id: UserId,

    /// Top-up amount in whole currency units. Positive. Immutable.
    pub amount: i64,

    /// Current status. Transitions pending -> success or pending -> failed
    /// exactly once; terminal states are never reversed.
    pub status: TxnStatus,

    /// Free-text reason for the payment.
    pub purpose: String,

    /// The gateway's own reference, once it has responded.
    pub gateway_txn_id: Option<String>,

    /// Raw reconciliation payload from the gateway callback.
    pub gateway_response: Option<serde_json::Value>,

    /// Failure reason reported by the gateway, if any.
    pub error_message: Option<String>,

    /// When the entry was created. Immutable.
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TopupTransaction {
    /// Create a new pending ledger entry for a top-up attempt.
    #[must_use]
    pub fn pending(user_id: UserId, amount: i64, purpose: String) -> Self {
        let now = Utc::now();
        Self {
            id: TxnId::generate(user_id),
            user_id,
            amount,
            status: TxnStatus::Pending,
            purpose,
            gateway_txn_id: None,
            gateway_response: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the entry has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.status, TxnStatus::Success | TxnStatus::Failed)
    }
}

/// Status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnStatus {
    /// Created locally; the gateway outcome is not yet known.
    Pending,

    /// The gateway confirmed payment and the wallet was credited.
    Success,

    /// The gateway reported failure; the wallet was not touched.
    Failed,
}

impl TxnStatus {
    /// Lowercase wire name for API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}
