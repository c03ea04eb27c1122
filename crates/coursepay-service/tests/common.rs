//! Common test utilities for coursepay integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use tempfile::TempDir;

use coursepay_core::UserId;
use coursepay_service::signature::callback_hash;
use coursepay_service::{create_router, AppState, ServiceConfig};
use coursepay_store::RocksStore;

/// JWT secret shared between the harness and the service under test.
pub const JWT_SECRET: &str = "test-jwt-secret";

/// Gateway signing salt used for callback signatures in tests.
pub const GATEWAY_SALT: &str = "test-gateway-salt";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// The email baked into the test user's token.
    pub test_email: String,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    email: String,
    exp: i64,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and no gateway.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a harness whose gateway client points at the given base URL
    /// (usually a wiremock server).
    pub fn with_gateway(gateway_base_url: &str) -> Self {
        Self::build(Some(gateway_base_url.to_string()))
    }

    fn build(gateway_base_url: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();
        let gateway_configured = gateway_base_url.is_some();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_jwt_secret: Some(JWT_SECRET.into()),
            service_api_key: Some(service_api_key.clone()),
            gateway_key: gateway_configured.then(|| "test-gateway-key".into()),
            gateway_salt: gateway_configured.then(|| GATEWAY_SALT.into()),
            gateway_base_url,
            app_url: "http://localhost:3000".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id,
            test_email: "student@example.com".into(),
            service_api_key,
        }
    }

    /// Get the authorization header for the harness's test user.
    pub fn user_auth_header(&self) -> String {
        auth_header_for(self.test_user_id, &self.test_email)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        auth_header_for(UserId::generate(), "other@example.com")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint a bearer token for the given user.
pub fn auth_header_for(user_id: UserId, email: &str) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT");

    format!("Bearer {token}")
}

/// Sign a set of callback fields the way the gateway would, returning the
/// full query set including the `hash` field.
pub fn signed_callback_params(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    let map: BTreeMap<String, String> = fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    let hash = callback_hash(&map, GATEWAY_SALT);

    let mut params: Vec<(String, String)> = map.into_iter().collect();
    params.push(("hash".to_string(), hash));
    params
}
