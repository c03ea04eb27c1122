//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, callbacks, enrollments, health, wallet};
use crate::state::AppState;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts (JWT auth)
/// - `POST /v1/accounts` - Create/register account
/// - `GET /v1/accounts/me` - Get current user's account
///
/// ## Wallet (JWT auth)
/// - `GET /v1/wallet/balance` - Get current balance
/// - `GET /v1/wallet/transactions` - List the top-up ledger
/// - `POST /v1/wallet/topup` - Initiate a top-up and get a payment link
/// - `POST /v1/wallet/credit` - Admin credit (service API key auth)
///
/// ## Enrollments (JWT auth)
/// - `POST /v1/enrollments` - Purchase a course with wallet balance
/// - `GET /v1/enrollments` - List enrollments
/// - `GET /v1/enrollments/:course_slug` - Get one enrollment
///
/// ## Gateway callbacks (JWT auth + signature verification)
/// - `GET /wallet/callbacks/success` - Settle a successful payment
/// - `GET /wallet/callbacks/failure` - Record a failed payment
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Create concurrency-limited API routes
    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/me", get(accounts::get_account))
        // Wallet
        .route("/wallet/balance", get(wallet::get_balance))
        .route("/wallet/transactions", get(wallet::list_transactions))
        .route("/wallet/topup", post(wallet::create_topup))
        .route("/wallet/credit", post(wallet::admin_credit))
        // Enrollments
        .route("/enrollments", post(enrollments::enroll))
        .route("/enrollments", get(enrollments::list_enrollments))
        .route("/enrollments/:course_slug", get(enrollments::get_enrollment))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Gateway redirect callbacks (no rate limit - driven by payment flow)
        .route("/wallet/callbacks/success", get(callbacks::payment_success))
        .route("/wallet/callbacks/failure", get(callbacks::payment_failure))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
