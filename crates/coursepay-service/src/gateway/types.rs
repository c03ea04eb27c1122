//! Payment gateway API types.

use serde::{Deserialize, Serialize};

/// Response from the create-payment-link endpoint.
///
/// The gateway signals success with `status: 1`; any other value is a
/// rejection and `message` carries the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    /// 1 on success, 0 on failure.
    pub status: i64,
    /// Payload present on success.
    #[serde(default)]
    pub data: Option<PaymentLink>,
    /// Error description present on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// A hosted payment page created by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLink {
    /// URL the user is redirected to for payment.
    pub payment_url: String,
    /// Gateway-side identifier for the link, when provided.
    #[serde(default)]
    pub payment_link_id: Option<String>,
}
