//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//!
//! Compound operations (credit, settle, enroll) take a per-wallet lock for
//! the duration of their read-modify-write cycle and commit with a single
//! `WriteBatch`, which gives serializable isolation per wallet record while
//! leaving different users' wallets free to proceed in parallel.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use coursepay_core::{Enrollment, TopupTransaction, TxnId, TxnStatus, UserId, Wallet};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{SettleOutcome, Store};

/// Table size at which `wallet_lock` sweeps out entries no caller holds.
const WALLET_LOCK_GC_THRESHOLD: usize = 1024;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    wallet_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            wallet_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Get the lock guarding a single wallet's read-modify-write cycle.
    ///
    /// The returned handle must be locked by the caller; holding it serializes
    /// all mutations of that wallet.
    ///
    /// Once the table crosses `WALLET_LOCK_GC_THRESHOLD` entries, inserting a
    /// new lock first sweeps out entries no caller currently holds, so the
    /// table tracks active wallets rather than every user ever seen.
    fn wallet_lock(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self
            .wallet_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if locks.len() >= WALLET_LOCK_GC_THRESHOLD && !locks.contains_key(user_id) {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(locks.entry(*user_id).or_default())
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read the wallet for a user, or `WalletNotFound`.
    fn require_wallet(&self, user_id: &UserId) -> Result<Wallet> {
        self.get_wallet(user_id)?
            .ok_or_else(|| StoreError::WalletNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Read the ledger entry for a transaction, or `TransactionNotFound`.
    fn require_topup(&self, txn_id: &TxnId) -> Result<TopupTransaction> {
        self.get_topup(txn_id)?
            .ok_or_else(|| StoreError::TransactionNotFound {
                txn_id: txn_id.to_string(),
            })
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    fn put_wallet(&self, wallet: &Wallet) -> Result<()> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(&wallet.user_id);
        let value = Self::serialize(wallet)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn get_balance(&self, user_id: &UserId) -> Result<i64> {
        Ok(self.get_wallet(user_id)?.map_or(0, |w| w.balance))
    }

    fn credit_wallet(&self, user_id: &UserId, amount: i64) -> Result<i64> {
        let lock = self.wallet_lock(user_id);
        let _guard: MutexGuard<'_, ()> =
            lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut wallet = self.require_wallet(user_id)?;
        wallet.balance += amount;
        wallet.updated_at = Utc::now();

        self.put_wallet(&wallet)?;
        Ok(wallet.balance)
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn create_topup(&self, txn: &TopupTransaction) -> Result<()> {
        let cf_topups = self.cf(cf::TOPUPS)?;
        let cf_by_user = self.cf(cf::TOPUPS_BY_USER)?;

        // The id scheme makes collisions impossible within a process, but the
        // ledger checks anyway.
        if self.get_topup(&txn.id)?.is_some() {
            return Err(StoreError::DuplicateTransaction {
                txn_id: txn.id.to_string(),
            });
        }

        let topup_key = keys::topup_key(&txn.id);
        let index_key = keys::user_topup_key(&txn.id);
        let value = Self::serialize(txn)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_topups, &topup_key, &value);
        batch.put_cf(&cf_by_user, &index_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_topup(&self, txn_id: &TxnId) -> Result<Option<TopupTransaction>> {
        let cf = self.cf(cf::TOPUPS)?;
        let key = keys::topup_key(txn_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_topups_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TopupTransaction>> {
        let cf_by_user = self.cf(cf::TOPUPS_BY_USER)?;
        let prefix = keys::user_topups_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Collect matching keys first; the millis component sorts them
        // chronologically, so reversing gives newest first.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut topups = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if topups.len() >= limit {
                break;
            }

            let txn_id = keys::txn_id_from_index_key(&key);
            if let Some(txn) = self.get_topup(&txn_id)? {
                topups.push(txn);
            }
        }

        Ok(topups)
    }

    fn settle_topup(
        &self,
        txn_id: &TxnId,
        amount: i64,
        gateway_txn_id: Option<String>,
        gateway_response: serde_json::Value,
    ) -> Result<SettleOutcome> {
        let user_id = txn_id.user_id();
        let lock = self.wallet_lock(&user_id);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut txn = self.require_topup(txn_id)?;

        match txn.status {
            TxnStatus::Success => {
                // Replayed callback: the credit already happened.
                tracing::info!(txn_id = %txn_id, "settle replay, ledger already success");
                return Ok(SettleOutcome::AlreadySettled {
                    balance: self.get_balance(&user_id)?,
                });
            }
            TxnStatus::Failed => {
                return Err(StoreError::InvalidTransition {
                    txn_id: txn_id.to_string(),
                    status: txn.status.as_str().to_string(),
                });
            }
            TxnStatus::Pending => {}
        }

        let mut wallet = self.require_wallet(&user_id)?;

        let now = Utc::now();
        txn.status = TxnStatus::Success;
        txn.gateway_txn_id = gateway_txn_id;
        txn.gateway_response = Some(gateway_response);
        txn.updated_at = now;

        wallet.balance += amount;
        wallet.updated_at = now;

        let cf_wallets = self.cf(cf::WALLETS)?;
        let cf_topups = self.cf(cf::TOPUPS)?;

        let wallet_value = Self::serialize(&wallet)?;
        let txn_value = Self::serialize(&txn)?;

        // The status flip and the credit commit together or not at all.
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_wallets, keys::wallet_key(&user_id), &wallet_value);
        batch.put_cf(&cf_topups, keys::topup_key(txn_id), &txn_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(SettleOutcome::Credited {
            balance: wallet.balance,
        })
    }

    fn mark_topup_failed(
        &self,
        txn_id: &TxnId,
        gateway_txn_id: Option<String>,
        gateway_response: serde_json::Value,
        error_message: Option<String>,
    ) -> Result<()> {
        let lock = self.wallet_lock(&txn_id.user_id());
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut txn = self.require_topup(txn_id)?;

        match txn.status {
            TxnStatus::Failed => {
                // Retried failure callback: nothing left to record.
                return Ok(());
            }
            TxnStatus::Success => {
                return Err(StoreError::InvalidTransition {
                    txn_id: txn_id.to_string(),
                    status: txn.status.as_str().to_string(),
                });
            }
            TxnStatus::Pending => {}
        }

        txn.status = TxnStatus::Failed;
        txn.gateway_txn_id = gateway_txn_id;
        txn.gateway_response = Some(gateway_response);
        txn.error_message = error_message;
        txn.updated_at = Utc::now();

        let cf = self.cf(cf::TOPUPS)?;
        let value = Self::serialize(&txn)?;
        self.db
            .put_cf(&cf, keys::topup_key(txn_id), value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Enrollment Operations
    // =========================================================================

    fn enroll(&self, enrollment: &Enrollment) -> Result<i64> {
        let lock = self.wallet_lock(&enrollment.user_id);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut wallet = self.require_wallet(&enrollment.user_id)?;

        // Check-then-act runs under the wallet lock, so two debits that would
        // jointly overdraw resolve to one success and one failure here.
        if wallet.balance < enrollment.price {
            return Err(StoreError::InsufficientBalance {
                balance: wallet.balance,
                required: enrollment.price,
            });
        }

        wallet.balance -= enrollment.price;
        wallet.updated_at = Utc::now();

        let cf_wallets = self.cf(cf::WALLETS)?;
        let cf_enrollments = self.cf(cf::ENROLLMENTS)?;

        let wallet_value = Self::serialize(&wallet)?;
        let enrollment_value = Self::serialize(enrollment)?;
        let enrollment_key = keys::enrollment_key(&enrollment.user_id, &enrollment.course_slug);

        // Debit and enrollment commit as one unit.
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_wallets, keys::wallet_key(&enrollment.user_id), &wallet_value);
        batch.put_cf(&cf_enrollments, &enrollment_key, &enrollment_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(wallet.balance)
    }

    fn get_enrollment(&self, user_id: &UserId, course_slug: &str) -> Result<Option<Enrollment>> {
        let cf = self.cf(cf::ENROLLMENTS)?;
        let key = keys::enrollment_key(user_id, course_slug);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_enrollments(&self, user_id: &UserId) -> Result<Vec<Enrollment>> {
        let cf = self.cf(cf::ENROLLMENTS)?;
        let prefix = keys::user_enrollments_prefix(user_id);

        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, rocksdb::Direction::Forward));

        let mut enrollments = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            enrollments.push(Self::deserialize(&value)?);
        }

        Ok(enrollments)
    }
}
