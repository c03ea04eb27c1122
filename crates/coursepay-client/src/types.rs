//! Request and response types for the coursepay client.

use serde::{Deserialize, Serialize};

/// Account response.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// User ID.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Current wallet balance in whole currency units.
    pub balance: i64,
    /// Created timestamp (RFC 3339).
    pub created_at: String,
}

/// Wallet balance response.
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    /// Balance in whole currency units.
    pub balance: i64,
}

/// A ledger transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub txn_id: String,
    /// Top-up amount in whole currency units.
    pub amount: i64,
    /// Status: pending, success, or failed.
    pub status: String,
    /// Purpose line for the payment.
    pub purpose: String,
    /// Gateway's own reference, once known.
    pub gateway_txn_id: Option<String>,
    /// Failure reason, if the payment failed.
    pub error_message: Option<String>,
    /// Timestamp (RFC 3339).
    pub created_at: String,
}

/// Transaction list response.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionList {
    /// Transactions (newest first).
    pub transactions: Vec<Transaction>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// Top-up request.
#[derive(Debug, Clone, Serialize)]
pub struct TopupRequest {
    /// Amount in whole currency units.
    pub amount: i64,
}

/// Top-up response.
#[derive(Debug, Clone, Deserialize)]
pub struct TopupResponse {
    /// Ledger transaction ID.
    pub txn_id: String,
    /// Hosted payment page to redirect the user to.
    pub payment_url: String,
    /// Amount in whole currency units.
    pub amount: i64,
    /// Ledger status at creation (always pending).
    pub status: String,
}

/// Enrollment request.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollRequest {
    /// Course identifier.
    pub course_slug: String,
    /// Billing plan ("monthly" or "annual").
    pub plan: String,
    /// Price snapshot in whole currency units.
    pub price: i64,
}

/// An enrollment record.
#[derive(Debug, Clone, Deserialize)]
pub struct Enrollment {
    /// Course identifier.
    pub course_slug: String,
    /// Billing plan.
    pub plan: String,
    /// Price paid in whole currency units.
    pub price: i64,
    /// Enrollment status.
    pub status: String,
    /// Purchase timestamp (RFC 3339).
    pub purchased_at: String,
}

/// Enrollment purchase response.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollResponse {
    /// The enrollment record.
    pub enrollment: Enrollment,
    /// Wallet balance after the debit.
    pub balance: i64,
}

/// Enrollment list response.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentList {
    /// The user's enrollments.
    pub enrollments: Vec<Enrollment>,
}

/// Admin credit response.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCreditResponse {
    /// User that was credited.
    pub user_id: String,
    /// New wallet balance.
    pub balance: i64,
}

/// API error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// The error body.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Structured details, when present.
    pub details: Option<serde_json::Value>,
}
