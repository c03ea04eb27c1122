//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad input - validation failed before any side effect.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Conflict - resource already exists or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Wallet balance cannot cover the requested debit.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
        /// Purchase context preserved so the client can resume after top-up.
        context: Option<serde_json::Value>,
    },

    /// No wallet record exists for a signed-up user. Data-integrity failure.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// Callback signature did not verify. Treated as a security event.
    #[error("payment verification failed")]
    VerificationFailed,

    /// The gateway reported the payment as unsuccessful.
    #[error("payment not successful: {0}")]
    PaymentNotSuccessful(String),

    /// Required secrets or URLs are missing.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// The outbound gateway call failed.
    #[error("gateway error: {0}")]
    GatewayError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone(), None)
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::InsufficientBalance {
                balance,
                required,
                context,
            } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_balance",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required,
                    "shortfall": required - balance,
                    "context": context,
                })),
            ),
            Self::WalletNotFound(user_id) => {
                tracing::error!(user_id = %user_id, "Wallet missing for signed-up user");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "wallet_not_found",
                    self.to_string(),
                    None,
                )
            }
            Self::VerificationFailed => (
                StatusCode::BAD_REQUEST,
                "verification_failed",
                self.to_string(),
                None,
            ),
            Self::PaymentNotSuccessful(msg) => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_not_successful",
                msg.clone(),
                None,
            ),
            Self::ConfigurationError(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "Service is not configured for payments".to_string(),
                    None,
                )
            }
            Self::GatewayError(msg) => {
                tracing::error!(error = %msg, "Gateway call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "gateway_error",
                    "Failed to reach the payment gateway".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<coursepay_store::StoreError> for ApiError {
    fn from(err: coursepay_store::StoreError) -> Self {
        match err {
            coursepay_store::StoreError::WalletNotFound { user_id } => {
                Self::WalletNotFound(user_id)
            }
            coursepay_store::StoreError::TransactionNotFound { txn_id } => {
                Self::NotFound(format!("transaction not found: {txn_id}"))
            }
            coursepay_store::StoreError::InsufficientBalance { balance, required } => {
                Self::InsufficientBalance {
                    balance,
                    required,
                    context: None,
                }
            }
            coursepay_store::StoreError::DuplicateTransaction { txn_id } => {
                Self::Conflict(format!("transaction already exists: {txn_id}"))
            }
            coursepay_store::StoreError::InvalidTransition { txn_id, status } => {
                Self::Conflict(format!("transaction {txn_id} is already {status}"))
            }
            coursepay_store::StoreError::Database(msg)
            | coursepay_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
