//! Error types for coursepay storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No wallet record exists for the user.
    #[error("wallet not found: {user_id}")]
    WalletNotFound {
        /// The user whose wallet was missing.
        user_id: String,
    },

    /// No ledger entry exists for the transaction id.
    #[error("transaction not found: {txn_id}")]
    TransactionNotFound {
        /// The transaction id that was not found.
        txn_id: String,
    },

    /// Balance is too low for a debit.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// A ledger entry with this id already exists.
    #[error("duplicate transaction: {txn_id}")]
    DuplicateTransaction {
        /// The duplicated transaction id.
        txn_id: String,
    },

    /// Attempted to move a terminal ledger entry to a different terminal state.
    #[error("invalid status transition for {txn_id}: already {status}")]
    InvalidTransition {
        /// The transaction id.
        txn_id: String,
        /// The terminal status the entry already holds.
        status: String,
    },
}
