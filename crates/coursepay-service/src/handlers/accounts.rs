//! Account management handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use coursepay_core::Wallet;
use coursepay_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// User ID.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Current wallet balance in whole currency units.
    pub balance: i64,
    /// Created timestamp.
    pub created_at: String,
}

fn account_response(wallet: &Wallet, email: String) -> AccountResponse {
    AccountResponse {
        user_id: wallet.user_id.to_string(),
        email,
        balance: wallet.balance,
        created_at: wallet.created_at.to_rfc3339(),
    }
}

/// Create the wallet account for the authenticated user.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    if state.store.get_wallet(&auth.user_id)?.is_some() {
        return Err(ApiError::Conflict("Account already exists".into()));
    }

    let wallet = Wallet::new(auth.user_id);
    state.store.put_wallet(&wallet)?;

    tracing::info!(user_id = %auth.user_id, "Account created");

    Ok(Json(account_response(&wallet, auth.email)))
}

/// Get the authenticated user's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let wallet = state
        .store
        .get_wallet(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(account_response(&wallet, auth.email)))
}
