//! `RocksDB` storage layer for coursepay.
//!
//! This crate provides persistent storage for wallets, the top-up ledger, and
//! enrollments using `RocksDB` with column families.
//!
//! # Architecture
//!
//! - `wallets`: wallet records, keyed by `user_id`
//! - `topups`: top-up ledger entries, keyed by `txn_id`
//! - `topups_by_user`: index for listing a user's ledger entries in time order
//! - `enrollments`: enrollment records, keyed by `user_id || course_slug`
//!
//! All balance mutations go through compound operations that hold a
//! per-wallet lock and commit with a single `WriteBatch`, so concurrent
//! mutations of the same wallet are linearized while different users'
//! wallets proceed independently.
//!
//! # Example
//!
//! ```no_run
//! use coursepay_store::{RocksStore, Store};
//! use coursepay_core::{UserId, Wallet};
//!
//! let store = RocksStore::open("/tmp/coursepay-db").unwrap();
//!
//! let user_id = UserId::generate();
//! store.put_wallet(&Wallet::new(user_id)).unwrap();
//! assert_eq!(store.get_balance(&user_id).unwrap(), 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use coursepay_core::{Enrollment, TopupTransaction, TxnId, UserId, Wallet};

/// Outcome of settling a success callback against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The entry transitioned pending -> success and the wallet was credited.
    Credited {
        /// Balance after the credit.
        balance: i64,
    },

    /// The entry was already success; no credit was applied (replay).
    AlreadySettled {
        /// Current balance, unchanged by this call.
        balance: i64,
    },
}

impl SettleOutcome {
    /// The wallet balance after the call, regardless of outcome.
    #[must_use]
    pub const fn balance(&self) -> i64 {
        match self {
            Self::Credited { balance } | Self::AlreadySettled { balance } => *balance,
        }
    }
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations behind the service.
pub trait Store: Send + Sync {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    /// Insert or update a wallet record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_wallet(&self, wallet: &Wallet) -> Result<()>;

    /// Get a wallet by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>>;

    /// Get the spendable balance for a user.
    ///
    /// Returns 0 if no wallet record exists: for reads, "no wallet" is
    /// treated as an empty wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_balance(&self, user_id: &UserId) -> Result<i64>;

    /// Credit a wallet atomically and return the new balance.
    ///
    /// Concurrent credits of the same wallet are serialized; both are
    /// reflected in the final balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WalletNotFound` if the wallet doesn't exist.
    fn credit_wallet(&self, user_id: &UserId, amount: i64) -> Result<i64>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Insert a new pending ledger entry.
    ///
    /// This also maintains the user index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateTransaction` if the id already exists.
    fn create_topup(&self, txn: &TopupTransaction) -> Result<()>;

    /// Get a ledger entry by transaction ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_topup(&self, txn_id: &TxnId) -> Result<Option<TopupTransaction>>;

    /// List ledger entries for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_topups_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TopupTransaction>>;

    /// Settle a verified success callback: compare-and-swap the ledger entry
    /// from pending to success and credit the wallet with `amount`, in one
    /// atomic write.
    ///
    /// A replayed callback finds the entry already success and returns
    /// `SettleOutcome::AlreadySettled` without touching the wallet.
    ///
    /// # Errors
    ///
    /// - `StoreError::TransactionNotFound` if the entry doesn't exist.
    /// - `StoreError::WalletNotFound` if the entry's wallet doesn't exist.
    /// - `StoreError::InvalidTransition` if the entry is already failed.
    fn settle_topup(
        &self,
        txn_id: &TxnId,
        amount: i64,
        gateway_txn_id: Option<String>,
        gateway_response: serde_json::Value,
    ) -> Result<SettleOutcome>;

    /// Mark a ledger entry failed with the gateway's reconciliation fields.
    ///
    /// Idempotent: marking an already-failed entry is a no-op. The wallet is
    /// never touched.
    ///
    /// # Errors
    ///
    /// - `StoreError::TransactionNotFound` if the entry doesn't exist.
    /// - `StoreError::InvalidTransition` if the entry is already success.
    fn mark_topup_failed(
        &self,
        txn_id: &TxnId,
        gateway_txn_id: Option<String>,
        gateway_response: serde_json::Value,
        error_message: Option<String>,
    ) -> Result<()>;

    // =========================================================================
    // Enrollment Operations
    // =========================================================================

    /// Debit the wallet by `enrollment.price` and write the enrollment record
    /// as a single atomic unit. Returns the new balance.
    ///
    /// Re-enrolling in the same course overwrites the prior record.
    ///
    /// # Errors
    ///
    /// - `StoreError::WalletNotFound` if the wallet doesn't exist.
    /// - `StoreError::InsufficientBalance` if the balance can't cover the
    ///   price; neither the wallet nor the enrollment record is modified.
    fn enroll(&self, enrollment: &Enrollment) -> Result<i64>;

    /// Get an enrollment by user and course slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_enrollment(&self, user_id: &UserId, course_slug: &str) -> Result<Option<Enrollment>>;

    /// List all enrollments for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_enrollments(&self, user_id: &UserId) -> Result<Vec<Enrollment>>;
}
