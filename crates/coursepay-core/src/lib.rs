//! Core types for the coursepay wallet and payment-reconciliation service.
//!
//! This crate provides the domain types shared by the store and service crates:
//!
//! - **Identifiers**: `UserId`, `TxnId`
//! - **Wallets**: `Wallet`
//! - **Ledger**: `TopupTransaction`, `TxnStatus`
//! - **Enrollments**: `Enrollment`, `Plan`, `EnrollmentStatus`
//!
//! # Currency unit
//!
//! Balances and amounts are whole currency units stored as `i64`. Wallet
//! balances never go negative; every mutation happens through an atomic
//! store operation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod enrollment;
pub mod ids;
pub mod topup;
pub mod wallet;

pub use enrollment::{Enrollment, EnrollmentStatus, Plan};
pub use ids::{IdError, TxnId, UserId};
pub use topup::{TopupTransaction, TxnStatus};
pub use wallet::Wallet;

/// Minimum top-up amount accepted by the payment link initiator.
pub const MIN_TOPUP_AMOUNT: i64 = 100;
