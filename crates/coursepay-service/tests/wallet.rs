//! Wallet balance, ledger, and top-up integration tests.

mod common;

use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a gateway mock that returns a payment link for every request.
async fn mock_gateway_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/create_payment_link/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "data": {
                "payment_url": "https://pay.example.com/link/abc123",
                "payment_link_id": "abc123"
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn balance_is_zero_without_wallet() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/wallet/balance")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn topup_below_minimum_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/wallet/topup")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"amount": 50}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_request");

    // Nothing was written to the ledger
    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert!(body["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn topup_without_gateway_is_configuration_error() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/wallet/topup")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"amount": 500}))
        .await;

    response.assert_status_internal_server_error();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "configuration_error");
}

#[tokio::test]
async fn topup_creates_pending_ledger_entry() {
    let gateway = MockServer::start().await;
    mock_gateway_success(&gateway).await;
    let harness = TestHarness::with_gateway(&gateway.uri());

    let response = harness
        .server
        .post("/v1/wallet/topup")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"amount": 500}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["payment_url"], "https://pay.example.com/link/abc123");
    assert_eq!(body["amount"], 500);
    assert_eq!(body["status"], "pending");
    let txn_id = body["txn_id"].as_str().unwrap().to_string();
    assert!(txn_id.starts_with("TXN_"));

    // The ledger shows the pending entry
    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["txn_id"], txn_id);
    assert_eq!(transactions[0]["status"], "pending");
}

#[tokio::test]
async fn topup_gateway_rejection_leaves_pending_entry() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create_payment_link/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 0,
            "message": "Invalid merchant key"
        })))
        .mount(&gateway)
        .await;
    let harness = TestHarness::with_gateway(&gateway.uri());

    let response = harness
        .server
        .post("/v1/wallet/topup")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"amount": 500}))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    // The pending entry survives for reconciliation
    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["status"], "pending");
}

#[tokio::test]
async fn transactions_paginate_newest_first() {
    let gateway = MockServer::start().await;
    mock_gateway_success(&gateway).await;
    let harness = TestHarness::with_gateway(&gateway.uri());

    for _ in 0..3 {
        harness
            .server
            .post("/v1/wallet/topup")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({"amount": 500}))
            .await
            .assert_status_ok();
    }

    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_query_param("limit", "2")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(body["has_more"], true);

    // Newest first
    let first = transactions[0]["created_at"].as_str().unwrap();
    let second = transactions[1]["created_at"].as_str().unwrap();
    assert!(first >= second);

    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_query_param("limit", "2")
        .add_query_param("offset", "2")
        .add_header("authorization", harness.user_auth_header())
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn admin_credit_requires_api_key() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    // Missing key
    harness
        .server
        .post("/v1/wallet/credit")
        .json(&json!({"user_id": harness.test_user_id.to_string(), "amount": 100}))
        .await
        .assert_status_unauthorized();

    // Wrong key
    harness
        .server
        .post("/v1/wallet/credit")
        .add_header("x-api-key", "wrong-key")
        .json(&json!({"user_id": harness.test_user_id.to_string(), "amount": 100}))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn admin_credit_updates_balance() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/wallet/credit")
        .add_header("x-api-key", harness.service_api_key.clone())
        .add_header("x-service-name", "support-cli")
        .json(&json!({
            "user_id": harness.test_user_id.to_string(),
            "amount": 750,
            "reason": "orphaned pending reconciliation"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], 750);

    let response = harness
        .server
        .get("/v1/wallet/balance")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], 750);
}

#[tokio::test]
async fn admin_credit_rejects_non_positive_amount() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/wallet/credit")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({"user_id": harness.test_user_id.to_string(), "amount": 0}))
        .await;

    response.assert_status_bad_request();
}
