//! Wallet balance, ledger, and top-up handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use coursepay_core::{TopupTransaction, MIN_TOPUP_AMOUNT};
use coursepay_store::Store;

use crate::auth::{AuthUser, ServiceAuth};
use crate::error::ApiError;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Wallet balance in whole currency units.
    pub balance: i64,
}

/// Get the current wallet balance.
///
/// A user who has never been credited simply has a zero balance; this is
/// not an error.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.store.get_balance(&auth.user_id)?;

    Ok(Json(BalanceResponse { balance }))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub txn_id: String,
    /// Top-up amount in whole currency units.
    pub amount: i64,
    /// Current status: pending, success, or failed.
    pub status: String,
    /// Purpose line for the payment.
    pub purpose: String,
    /// Gateway's own reference, once known.
    pub gateway_txn_id: Option<String>,
    /// Failure reason, if the payment failed.
    pub error_message: Option<String>,
    /// Timestamp.
    pub created_at: String,
}

impl From<&TopupTransaction> for TransactionResponse {
    fn from(txn: &TopupTransaction) -> Self {
        Self {
            txn_id: txn.id.to_string(),
            amount: txn.amount,
            status: txn.status.as_str().to_string(),
            purpose: txn.purpose.clone(),
            gateway_txn_id: txn.gateway_txn_id.clone(),
            error_message: txn.error_message.clone(),
            created_at: txn.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List the top-up ledger for the authenticated user.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let transactions = state
        .store
        .list_topups_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}

/// Top-up request.
#[derive(Debug, Deserialize)]
pub struct TopupRequest {
    /// Amount in whole currency units.
    pub amount: i64,
}

/// Top-up response.
#[derive(Debug, Serialize)]
pub struct TopupResponse {
    /// Ledger transaction ID, also used as the gateway txn ID.
    pub txn_id: String,
    /// Hosted payment page the user is redirected to.
    pub payment_url: String,
    /// Amount in whole currency units.
    pub amount: i64,
    /// Ledger status at creation (always pending).
    pub status: String,
}

/// Initiate a wallet top-up.
///
/// The pending ledger entry is written before the gateway is contacted, so
/// an outbound failure still leaves an auditable record. The entry stays
/// pending until a verified callback settles it.
pub async fn create_topup(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<TopupRequest>,
) -> Result<Json<TopupResponse>, ApiError> {
    if body.amount < MIN_TOPUP_AMOUNT {
        return Err(ApiError::InvalidRequest(format!(
            "Minimum top-up amount is {MIN_TOPUP_AMOUNT}"
        )));
    }
    // The payer email comes from the token, not the request body.
    if auth.email.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Email is required".into()));
    }

    let Some(gateway) = &state.gateway else {
        return Err(ApiError::ConfigurationError(
            "Payment gateway not configured".into(),
        ));
    };

    let txn = TopupTransaction::pending(auth.user_id, body.amount, "Add money to wallet".into());
    state.store.create_topup(&txn)?;

    tracing::info!(
        txn_id = %txn.id,
        user_id = %auth.user_id,
        amount = %body.amount,
        "Top-up initiated"
    );

    let link = gateway
        .create_payment_link(
            &txn.id,
            txn.amount,
            &auth.email,
            &txn.purpose,
            &state.config.app_url,
        )
        .await
        .map_err(|e| {
            // The pending entry stays in the ledger for reconciliation.
            tracing::error!(txn_id = %txn.id, error = %e, "Payment link creation failed");
            ApiError::GatewayError(e.to_string())
        })?;

    Ok(Json(TopupResponse {
        txn_id: txn.id.to_string(),
        payment_url: link.payment_url,
        amount: txn.amount,
        status: txn.status.as_str().to_string(),
    }))
}

/// Admin credit request.
#[derive(Debug, Deserialize)]
pub struct AdminCreditRequest {
    /// User to credit.
    pub user_id: String,
    /// Amount in whole currency units. Must be positive.
    pub amount: i64,
    /// Reason recorded in the log.
    pub reason: Option<String>,
}

/// Admin credit response.
#[derive(Debug, Serialize)]
pub struct AdminCreditResponse {
    /// User that was credited.
    pub user_id: String,
    /// New wallet balance.
    pub balance: i64,
}

/// Credit a wallet directly (service-to-service only).
///
/// Used for manual reconciliation of orphaned pendings and goodwill
/// grants.
pub async fn admin_credit(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    Json(body): Json<AdminCreditRequest>,
) -> Result<Json<AdminCreditResponse>, ApiError> {
    if body.amount <= 0 {
        return Err(ApiError::InvalidRequest("Amount must be positive".into()));
    }

    let user_id = body
        .user_id
        .parse()
        .map_err(|_| ApiError::InvalidRequest("Invalid user_id".into()))?;

    let balance = state.store.credit_wallet(&user_id, body.amount)?;

    tracing::info!(
        user_id = %user_id,
        amount = %body.amount,
        service = %service.service_name,
        reason = body.reason.as_deref().unwrap_or("unspecified"),
        "Admin credit applied"
    );

    Ok(Json(AdminCreditResponse {
        user_id: user_id.to_string(),
        balance,
    }))
}
