//! Payment gateway HTTP client.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;

use coursepay_core::TxnId;

use super::types::{CreateLinkResponse, PaymentLink};
use crate::signature::payment_request_hash;

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway rejected the request.
    #[error("Gateway error: {message}")]
    Api {
        /// Error message from the gateway.
        message: String,
    },

    /// Gateway accepted the request but the response was missing the link.
    #[error("Gateway response missing payment URL")]
    MissingPaymentUrl,
}

/// Client for the payment gateway's payment-link API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    key: String,
    salt: String,
    base_url: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(key: impl Into<String>, salt: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let base_url = base_url.into();

        Self {
            client,
            key: key.into(),
            salt: salt.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a hosted payment link for a top-up.
    ///
    /// The transaction is identified to the gateway by `txn_id`, which is
    /// also carried back through the signed redirect URLs so the callback
    /// handlers can find the matching ledger entry.
    ///
    /// # Arguments
    ///
    /// * `txn_id` - Ledger transaction ID, reused as the gateway txn ID
    /// * `amount` - Top-up amount in whole currency units
    /// * `email` - Payer email forwarded to the gateway
    /// * `purpose` - Human-readable purpose line shown on the payment page
    /// * `app_url` - Public base URL of this service, for redirect targets
    pub async fn create_payment_link(
        &self,
        txn_id: &TxnId,
        amount: i64,
        email: &str,
        purpose: &str,
        app_url: &str,
    ) -> Result<PaymentLink, GatewayError> {
        let fields = self.link_fields(txn_id, amount, email, purpose, app_url);
        let hash = payment_request_hash(&fields, &self.salt);

        let mut form: Vec<(String, String)> = fields.into_iter().collect();
        form.push(("hash".to_string(), hash));

        tracing::debug!(
            txn_id = %txn_id,
            amount = %amount,
            "Requesting payment link from gateway"
        );

        let response = self
            .client
            .post(format!("{}/api/create_payment_link/", self.base_url))
            .form(&form)
            .send()
            .await?;

        let body: CreateLinkResponse = response.error_for_status()?.json().await?;

        if body.status != 1 {
            return Err(GatewayError::Api {
                message: body
                    .message
                    .unwrap_or_else(|| "payment link creation failed".to_string()),
            });
        }

        body.data.ok_or(GatewayError::MissingPaymentUrl)
    }

    /// Build the signed field set for a payment-link request.
    ///
    /// Every field listed here participates in the request signature, so
    /// the redirect URLs (which carry the `txn_id` query parameter) are
    /// covered by it and cannot be swapped out in transit.
    fn link_fields(
        &self,
        txn_id: &TxnId,
        amount: i64,
        email: &str,
        purpose: &str,
        app_url: &str,
    ) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("key".to_string(), self.key.clone());
        fields.insert("txn_id".to_string(), txn_id.to_string());
        fields.insert("amount".to_string(), amount.to_string());
        fields.insert("email".to_string(), email.to_string());
        fields.insert("phone".to_string(), "0000000000".to_string());
        fields.insert("purpose".to_string(), purpose.to_string());
        fields.insert(
            "redirect_url".to_string(),
            format!("{app_url}/wallet/callbacks/success?txn_id={txn_id}"),
        );
        fields.insert(
            "s2_url".to_string(),
            format!("{app_url}/wallet/callbacks/failure?txn_id={txn_id}"),
        );
        fields
    }
}
