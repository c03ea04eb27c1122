//! Client error types.

/// Errors that can occur when using the coursepay client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Wallet balance cannot cover the purchase.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
        /// Purchase context echoed by the server, for resuming after top-up.
        context: Option<serde_json::Value>,
    },

    /// Account not found.
    #[error("account not found")]
    AccountNotFound,

    /// The gateway reported the payment as unsuccessful.
    #[error("payment not successful: {message}")]
    PaymentNotSuccessful {
        /// Reason reported by the server.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
