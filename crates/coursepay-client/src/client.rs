//! CoursePay HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    Account, AdminCreditResponse, ApiErrorResponse, Balance, EnrollRequest, EnrollResponse,
    Enrollment, EnrollmentList, TopupRequest, TopupResponse, TransactionList,
};

/// Options for constructing a [`CoursepayClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Service name sent in the `x-service-name` header.
    pub service_name: String,
}

impl ClientOptions {
    /// Create options with a custom service name.
    #[must_use]
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

/// CoursePay API client.
///
/// Provides methods for wallet, top-up, and enrollment operations. Most
/// methods act on behalf of a user and take that user's JWT; admin
/// operations use the service API key instead.
#[derive(Debug, Clone)]
pub struct CoursepayClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl CoursepayClient {
    /// Create a new coursepay client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the coursepay service (e.g., `"http://coursepay:8080"`)
    /// * `api_key` - Service API key for admin operations
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new coursepay client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_name: options.service_name,
        }
    }

    /// Create the wallet account for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the account already exists.
    pub async fn create_account(&self, user_jwt: &str) -> Result<Account, ClientError> {
        let url = format!("{}/v1/accounts", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the authenticated user's account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no account exists.
    pub async fn get_account(&self, user_jwt: &str) -> Result<Account, ClientError> {
        let url = format!("{}/v1/accounts/me", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the user's current wallet balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_balance(&self, user_jwt: &str) -> Result<Balance, ClientError> {
        let url = format!("{}/v1/wallet/balance", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the user's top-up ledger, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_transactions(
        &self,
        user_jwt: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<TransactionList, ClientError> {
        let url = format!("{}/v1/wallet/transactions", self.base_url);

        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Initiate a wallet top-up and get a hosted payment link.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the amount is below the
    /// server-side minimum, or the gateway rejects the request.
    pub async fn create_topup(
        &self,
        user_jwt: &str,
        request: TopupRequest,
    ) -> Result<TopupResponse, ClientError> {
        let url = format!("{}/v1/wallet/topup", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Purchase a course with the user's wallet balance.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InsufficientBalance`] with the purchase
    /// context when the wallet cannot cover the price.
    pub async fn enroll(
        &self,
        user_jwt: &str,
        request: EnrollRequest,
    ) -> Result<EnrollResponse, ClientError> {
        let url = format!("{}/v1/enrollments", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the user's enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_enrollments(&self, user_jwt: &str) -> Result<EnrollmentList, ClientError> {
        let url = format!("{}/v1/enrollments", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a single enrollment by course slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no enrollment exists.
    pub async fn get_enrollment(
        &self,
        user_jwt: &str,
        course_slug: &str,
    ) -> Result<Enrollment, ClientError> {
        let url = format!("{}/v1/enrollments/{course_slug}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {user_jwt}"))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Credit a wallet directly (service API key auth).
    ///
    /// Used by support tooling for manual reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn admin_credit(
        &self,
        user_id: impl Into<String>,
        amount: i64,
        reason: Option<String>,
    ) -> Result<AdminCreditResponse, ClientError> {
        let url = format!("{}/v1/wallet/credit", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&serde_json::json!({
                "user_id": user_id.into(),
                "amount": amount,
                "reason": reason,
            }))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match code {
                    "insufficient_balance" => {
                        let details = api_error.error.details.as_ref();
                        let balance = details
                            .and_then(|d| d.get("balance"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);
                        let required = details
                            .and_then(|d| d.get("required"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);
                        let context = details.and_then(|d| d.get("context")).cloned();

                        Err(ClientError::InsufficientBalance {
                            balance,
                            required,
                            context,
                        })
                    }
                    "payment_not_successful" => Err(ClientError::PaymentNotSuccessful { message }),
                    "not_found" if message.contains("Account") => Err(ClientError::AccountNotFound),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}
