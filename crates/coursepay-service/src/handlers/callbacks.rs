//! Payment gateway callback handlers.
//!
//! The gateway redirects the payer back with the transaction outcome in the
//! query string, signed with the merchant salt. Reconciliation happens here:
//! a verified success settles the ledger entry and credits the wallet, a
//! failure marks the entry failed. Both paths are idempotent so a refreshed
//! or replayed redirect cannot double-apply.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use coursepay_core::TxnId;
use coursepay_store::{SettleOutcome, Store, StoreError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::signature::verify_callback;
use crate::state::AppState;

/// Success callback response.
#[derive(Debug, Serialize)]
pub struct SuccessCallbackResponse {
    /// Ledger transaction ID.
    pub txn_id: String,
    /// Final ledger status.
    pub status: String,
    /// Amount credited.
    pub amount: i64,
    /// Gateway's own reference for the payment, when provided.
    pub gateway_txn_id: Option<String>,
    /// Wallet balance after settlement.
    pub balance: i64,
    /// False when this was a replay of an already-settled callback.
    pub credited: bool,
}

/// Handle a signed success redirect from the gateway.
///
/// Order of checks matters: the signature is verified before any field is
/// trusted, and only a verified `success` status reaches the ledger.
pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SuccessCallbackResponse>, ApiError> {
    let Some(salt) = &state.config.gateway_salt else {
        return Err(ApiError::ConfigurationError(
            "Payment gateway not configured".into(),
        ));
    };

    if !verify_callback(&params, salt) {
        tracing::warn!(
            user_id = %auth.user_id,
            "Callback signature verification failed"
        );
        return Err(ApiError::VerificationFailed);
    }

    let txn_id = extract_txn_id(&params)?;

    let status = params.get("status").map(String::as_str).unwrap_or("");
    if status != "success" && status != "1" {
        // The gateway signed a non-success outcome on the success URL.
        // Record the failure rather than leaving the entry pending.
        mark_failed_quietly(&state, &txn_id, &params);
        return Err(ApiError::PaymentNotSuccessful(format!(
            "Gateway reported status '{status}'"
        )));
    }

    let amount = params
        .get("amount")
        .and_then(|v| parse_amount(v))
        .ok_or_else(|| ApiError::InvalidRequest("Missing or invalid amount".into()))?;

    if let Some(txn) = state.store.get_topup(&txn_id)? {
        if txn.amount != amount {
            tracing::warn!(
                txn_id = %txn_id,
                requested = %txn.amount,
                received = %amount,
                "Callback amount differs from initiated amount"
            );
        }
    }

    let gateway_txn_id = extract_gateway_ref(&params);
    let outcome = state.store.settle_topup(
        &txn_id,
        amount,
        gateway_txn_id.clone(),
        serde_json::to_value(&params).unwrap_or_default(),
    )?;

    let credited = matches!(outcome, SettleOutcome::Credited { .. });
    if credited {
        tracing::info!(txn_id = %txn_id, amount = %amount, "Top-up settled");
    } else {
        tracing::info!(txn_id = %txn_id, "Replayed success callback ignored");
    }

    Ok(Json(SuccessCallbackResponse {
        txn_id: txn_id.to_string(),
        status: "success".to_string(),
        amount,
        gateway_txn_id,
        balance: outcome.balance(),
        credited,
    }))
}

/// Failure callback response.
#[derive(Debug, Serialize)]
pub struct FailureCallbackResponse {
    /// Ledger transaction ID, when the redirect carried one.
    pub txn_id: Option<String>,
    /// Final ledger status.
    pub status: String,
    /// Failure reason reported by the gateway.
    pub error_message: Option<String>,
}

/// Handle a failure redirect from the gateway.
///
/// Failure redirects are best-effort: some gateways omit the signature on
/// this path, so an unverifiable or incomplete redirect is logged and
/// acknowledged rather than rejected. The wallet is never touched here.
pub async fn payment_failure(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FailureCallbackResponse>, ApiError> {
    if let Some(salt) = &state.config.gateway_salt {
        if !verify_callback(&params, salt) {
            tracing::warn!(
                user_id = %auth.user_id,
                "Unverified failure callback"
            );
        }
    }

    let error_message = extract_error_message(&params);

    let txn_id = match extract_txn_id(&params) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Failure callback without a resolvable txn_id");
            return Ok(Json(FailureCallbackResponse {
                txn_id: None,
                status: "failed".to_string(),
                error_message,
            }));
        }
    };

    let result = state.store.mark_topup_failed(
        &txn_id,
        extract_gateway_ref(&params),
        serde_json::to_value(&params).unwrap_or_default(),
        error_message.clone(),
    );

    match result {
        Ok(()) => {
            tracing::info!(txn_id = %txn_id, "Top-up marked failed");
        }
        Err(StoreError::TransactionNotFound { .. }) => {
            tracing::warn!(txn_id = %txn_id, "Failure callback for unknown transaction");
        }
        Err(StoreError::InvalidTransition { .. }) => {
            // Already settled as success; a late failure never reverses it.
            tracing::warn!(txn_id = %txn_id, "Failure callback for settled transaction ignored");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(FailureCallbackResponse {
        txn_id: Some(txn_id.to_string()),
        status: "failed".to_string(),
        error_message,
    }))
}

/// Pull the transaction ID out of the callback parameters.
///
/// The signed redirect URL carries `txn_id`; the gateway's own postback
/// field is `txnid`. Either works.
fn extract_txn_id(params: &HashMap<String, String>) -> Result<TxnId, ApiError> {
    let raw = params
        .get("txn_id")
        .or_else(|| params.get("txnid"))
        .ok_or_else(|| ApiError::InvalidRequest("Missing txn_id".into()))?;

    raw.parse()
        .map_err(|_| ApiError::InvalidRequest("Malformed txn_id".into()))
}

/// Pull the gateway's own payment reference out of the callback parameters.
///
/// Our contract names the field `gateway_txn_id`; the hosted gateway posts
/// it as `easepayid`.
fn extract_gateway_ref(params: &HashMap<String, String>) -> Option<String> {
    params
        .get("gateway_txn_id")
        .or_else(|| params.get("easepayid"))
        .cloned()
}

/// Pull the failure reason out of the callback parameters.
///
/// The hosted gateway posts `error_Message`; other integrations use
/// `error_message` or `reason`.
fn extract_error_message(params: &HashMap<String, String>) -> Option<String> {
    params
        .get("error_Message")
        .or_else(|| params.get("error_message"))
        .or_else(|| params.get("reason"))
        .cloned()
}

/// Parse a callback amount into whole currency units.
///
/// The gateway formats amounts inconsistently ("500" or "500.0"), so both
/// integer and integral-float forms are accepted. Anything non-positive or
/// fractional is rejected.
fn parse_amount(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return (value > 0).then_some(value);
    }

    let value = raw.parse::<f64>().ok()?;
    if value > 0.0 && value.fract() == 0.0 && value <= i64::MAX as f64 {
        #[allow(clippy::cast_possible_truncation)]
        return Some(value as i64);
    }
    None
}

/// Record a signed non-success outcome, swallowing bookkeeping errors so
/// the caller can still report the payment failure itself.
fn mark_failed_quietly(state: &AppState, txn_id: &TxnId, params: &HashMap<String, String>) {
    let result = state.store.mark_topup_failed(
        txn_id,
        extract_gateway_ref(params),
        serde_json::to_value(params).unwrap_or_default(),
        extract_error_message(params),
    );

    if let Err(e) = result {
        tracing::warn!(txn_id = %txn_id, error = %e, "Failed to record non-success outcome");
    }
}
