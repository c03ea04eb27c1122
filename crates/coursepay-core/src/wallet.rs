//! Wallet types for coursepay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A per-user spendable balance.
///
/// The wallet is the single source of truth for spendable funds. Its balance
/// is only ever mutated inside an atomic store operation and never goes
/// negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// The owning user.
    pub user_id: UserId,

    /// Current balance in whole currency units. Never negative.
    pub balance: i64,

    /// When the wallet was created.
    pub created_at: DateTime<Utc>,

    /// When the wallet was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet with zero balance (at account signup).
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the wallet can cover a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_balance(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_has_zero_balance() {
        let wallet = Wallet::new(UserId::generate());
        assert_eq!(wallet.balance, 0);
    }

    #[test]
    fn sufficient_balance_check() {
        let mut wallet = Wallet::new(UserId::generate());
        wallet.balance = 500;

        assert!(wallet.has_sufficient_balance(300));
        assert!(wallet.has_sufficient_balance(500));
        assert!(!wallet.has_sufficient_balance(501));
    }
}
