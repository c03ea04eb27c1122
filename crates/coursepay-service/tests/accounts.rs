//! Account management integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn create_account_success() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], harness.test_user_id.to_string());
    assert_eq!(body["email"], "student@example.com");
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn create_account_twice_conflicts() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_conflict();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn get_account_before_create_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn account_requires_auth() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/accounts")
        .await
        .assert_status_unauthorized();

    harness
        .server
        .get("/v1/accounts/me")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn garbage_token_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", "Bearer not-a-jwt")
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "coursepay");
}
