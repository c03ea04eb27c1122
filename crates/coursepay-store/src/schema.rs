//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Wallet records, keyed by `user_id`.
    pub const WALLETS: &str = "wallets";

    /// Top-up ledger entries, keyed by `txn_id`.
    pub const TOPUPS: &str = "topups";

    /// Index: top-ups by user, keyed by `user_id || millis`.
    /// Value is empty (the transaction id reconstructs from the key).
    pub const TOPUPS_BY_USER: &str = "topups_by_user";

    /// Enrollment records, keyed by `user_id || course_slug`.
    pub const ENROLLMENTS: &str = "enrollments";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::WALLETS, cf::TOPUPS, cf::TOPUPS_BY_USER, cf::ENROLLMENTS]
}
