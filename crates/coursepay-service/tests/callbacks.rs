//! Gateway callback reconciliation integration tests.

mod common;

use common::{signed_callback_params, TestHarness};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Spin up a harness with a mocked gateway, an account, and one pending
/// top-up. Returns the harness and the pending transaction's ID.
async fn harness_with_pending_topup(amount: i64) -> (TestHarness, String) {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create_payment_link/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 1,
            "data": {"payment_url": "https://pay.example.com/link/abc123"}
        })))
        .mount(&gateway)
        .await;

    let harness = TestHarness::with_gateway(&gateway.uri());

    harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/wallet/topup")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"amount": amount}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let txn_id = body["txn_id"].as_str().unwrap().to_string();

    (harness, txn_id)
}

async fn balance_of(harness: &TestHarness) -> i64 {
    let response = harness
        .server
        .get("/v1/wallet/balance")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    body["balance"].as_i64().unwrap()
}

#[tokio::test]
async fn verified_success_credits_wallet() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "success"),
        ("amount", "500"),
        ("easepayid", "EZ-1001"),
    ]);

    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credited"], true);
    assert_eq!(body["balance"], 500);
    assert_eq!(body["status"], "success");

    assert_eq!(balance_of(&harness).await, 500);

    // The ledger entry is terminal with the gateway reference attached
    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let txn = &body["transactions"][0];
    assert_eq!(txn["status"], "success");
    assert_eq!(txn["gateway_txn_id"], "EZ-1001");
}

#[tokio::test]
async fn replayed_success_not_double_credited() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "success"),
        ("amount", "500"),
    ]);

    harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    // Replay the exact same signed redirect
    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credited"], false);
    assert_eq!(body["balance"], 500);

    assert_eq!(balance_of(&harness).await, 500);
}

#[tokio::test]
async fn tampered_amount_rejected() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let mut params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "success"),
        ("amount", "500"),
    ]);

    // Inflate the amount after signing
    for (name, value) in &mut params {
        if name == "amount" {
            *value = "99999".to_string();
        }
    }

    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "verification_failed");

    // Wallet and ledger untouched
    assert_eq!(balance_of(&harness).await, 0);

    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"][0]["status"], "pending");
}

#[tokio::test]
async fn missing_hash_rejected() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_param("txn_id", &txn_id)
        .add_query_param("status", "success")
        .add_query_param("amount", "500")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
    assert_eq!(balance_of(&harness).await, 0);
}

#[tokio::test]
async fn signed_failure_status_on_success_url() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "failure"),
        ("amount", "500"),
        ("error_Message", "Card declined"),
    ]);

    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "payment_not_successful");

    // The entry was moved to failed rather than left pending
    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let txn = &body["transactions"][0];
    assert_eq!(txn["status"], "failed");
    assert_eq!(txn["error_message"], "Card declined");
    assert_eq!(balance_of(&harness).await, 0);
}

#[tokio::test]
async fn signed_failure_reason_recorded_in_lowercase_field() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "failure"),
        ("amount", "500"),
        ("reason", "Insufficient funds at issuer"),
    ]);

    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);

    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let txn = &body["transactions"][0];
    assert_eq!(txn["status"], "failed");
    assert_eq!(txn["error_message"], "Insufficient funds at issuer");
}

#[tokio::test]
async fn failure_callback_marks_entry_failed() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "failure"),
        ("error_Message", "User cancelled"),
    ]);

    let response = harness
        .server
        .get("/wallet/callbacks/failure")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "failed");
    assert_eq!(body["error_message"], "User cancelled");

    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"][0]["status"], "failed");
    assert_eq!(balance_of(&harness).await, 0);
}

#[tokio::test]
async fn late_failure_does_not_reverse_settlement() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let success = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "success"),
        ("amount", "500"),
    ]);
    harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&success)
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let failure = signed_callback_params(&[("txn_id", &txn_id), ("status", "failure")]);
    let response = harness
        .server
        .get("/wallet/callbacks/failure")
        .add_query_params(&failure)
        .add_header("authorization", harness.user_auth_header())
        .await;

    // Acknowledged but the settled entry and balance are untouched
    response.assert_status_ok();
    assert_eq!(balance_of(&harness).await, 500);

    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"][0]["status"], "success");
}

#[tokio::test]
async fn success_for_unknown_transaction_fails() {
    let (harness, _txn_id) = harness_with_pending_topup(500).await;

    let other = format!(
        "TXN_{}_{}",
        coursepay_core::UserId::generate(),
        1_700_000_000_000_i64
    );
    let params = signed_callback_params(&[
        ("txn_id", &other),
        ("status", "success"),
        ("amount", "500"),
    ]);

    let response = harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
    assert_eq!(balance_of(&harness).await, 0);
}

#[tokio::test]
async fn callbacks_require_auth() {
    let (harness, txn_id) = harness_with_pending_topup(500).await;

    let params = signed_callback_params(&[
        ("txn_id", &txn_id),
        ("status", "success"),
        ("amount", "500"),
    ]);

    harness
        .server
        .get("/wallet/callbacks/success")
        .add_query_params(&params)
        .await
        .assert_status_unauthorized();
}
