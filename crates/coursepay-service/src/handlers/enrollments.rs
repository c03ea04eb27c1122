//! Course enrollment handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use coursepay_core::{Enrollment, Plan};
use coursepay_store::{Store, StoreError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Enrollment request.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Course identifier.
    pub course_slug: String,
    /// Billing plan.
    pub plan: Plan,
    /// Price snapshot in whole currency units.
    pub price: i64,
}

/// Enrollment response.
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    /// Course identifier.
    pub course_slug: String,
    /// Billing plan.
    pub plan: String,
    /// Price paid in whole currency units.
    pub price: i64,
    /// Enrollment status.
    pub status: String,
    /// Purchase timestamp.
    pub purchased_at: String,
}

impl From<&Enrollment> for EnrollmentResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            course_slug: enrollment.course_slug.clone(),
            plan: enrollment.plan.as_str().to_string(),
            price: enrollment.price,
            status: format!("{:?}", enrollment.status).to_lowercase(),
            purchased_at: enrollment.purchased_at.to_rfc3339(),
        }
    }
}

/// Enroll response with the post-debit balance.
#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    /// The enrollment record.
    pub enrollment: EnrollmentResponse,
    /// Wallet balance after the debit.
    pub balance: i64,
}

/// Purchase a course with wallet balance.
///
/// Debit and enrollment are a single atomic unit: an insufficient balance
/// leaves both the wallet and the course list untouched, and the error
/// carries the purchase context so the client can resume after a top-up.
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<EnrollRequest>,
) -> Result<Json<EnrollResponse>, ApiError> {
    if body.course_slug.trim().is_empty() {
        return Err(ApiError::InvalidRequest("course_slug is required".into()));
    }
    if body.price <= 0 {
        return Err(ApiError::InvalidRequest("Price must be positive".into()));
    }

    let enrollment = Enrollment::new(
        auth.user_id,
        auth.email.clone(),
        body.course_slug.clone(),
        body.plan,
        body.price,
    );

    let balance = state.store.enroll(&enrollment).map_err(|e| match e {
        StoreError::InsufficientBalance { balance, required } => ApiError::InsufficientBalance {
            balance,
            required,
            context: Some(serde_json::json!({
                "course_slug": body.course_slug,
                "plan": body.plan,
                "price": body.price,
                "shortfall": required - balance,
            })),
        },
        other => other.into(),
    })?;

    tracing::info!(
        user_id = %auth.user_id,
        course_slug = %enrollment.course_slug,
        plan = %enrollment.plan.as_str(),
        price = %enrollment.price,
        balance = %balance,
        "Course enrollment completed"
    );

    Ok(Json(EnrollResponse {
        enrollment: EnrollmentResponse::from(&enrollment),
        balance,
    }))
}

/// List enrollments response.
#[derive(Debug, Serialize)]
pub struct ListEnrollmentsResponse {
    /// The user's enrollments.
    pub enrollments: Vec<EnrollmentResponse>,
}

/// List the authenticated user's enrollments.
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ListEnrollmentsResponse>, ApiError> {
    let enrollments = state.store.list_enrollments(&auth.user_id)?;

    Ok(Json(ListEnrollmentsResponse {
        enrollments: enrollments.iter().map(EnrollmentResponse::from).collect(),
    }))
}

/// Get a single enrollment by course slug.
pub async fn get_enrollment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(course_slug): Path<String>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let enrollment = state
        .store
        .get_enrollment(&auth.user_id, &course_slug)?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".into()))?;

    Ok(Json(EnrollmentResponse::from(&enrollment)))
}
