//! Course enrollment types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A course enrollment purchased from wallet balance.
///
/// One record exists per `(user_id, course_slug)` pair; re-purchasing the
/// same course overwrites the record, which is how plan upgrades and
/// downgrades work. `price` is a snapshot of the amount debited at purchase
/// time and is never recomputed from live course pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// The enrolled user.
    pub user_id: UserId,

    /// Email of the user at purchase time.
    pub user_email: String,

    /// Stable course identifier.
    pub course_slug: String,

    /// The plan purchased.
    pub plan: Plan,

    /// Amount debited from the wallet for this enrollment.
    pub price: i64,

    /// Current lifecycle status.
    pub status: EnrollmentStatus,

    /// When the enrollment was purchased.
    pub purchased_at: DateTime<Utc>,
}

impl Enrollment {
    /// Create a new active enrollment.
    #[must_use]
    pub fn new(
        user_id: UserId,
        user_email: String,
        course_slug: String,
        plan: Plan,
        price: i64,
    ) -> Self {
        Self {
            user_id,
            user_email,
            course_slug,
            plan,
            price,
            status: EnrollmentStatus::Active,
            purchased_at: Utc::now(),
        }
    }
}

/// Billing plan for an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Billed per month.
    Monthly,

    /// Billed per year.
    Annual,
}

impl Plan {
    /// Lowercase wire name for API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

/// Lifecycle status of an enrollment.
///
/// Transitions to `Completed`/`Cancelled` are driven by processes outside
/// the wallet core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// The enrollment is active.
    Active,

    /// The course was completed.
    Completed,

    /// The enrollment was cancelled.
    Cancelled,
}
