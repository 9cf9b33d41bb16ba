//! Enrollment model tying students to departments

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ENROLLMENT_PENDING: &str = "pending";
pub const ENROLLMENT_APPROVED: &str = "approved";
pub const ENROLLMENT_DECLINED: &str = "declined";

/// Enrollment request from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub department_id: Uuid,
    /// One of "pending", "approved", "declined"
    pub status: String,
    pub requested_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<Uuid>,
}

/// Enrollment request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEnrollment {
    pub department_id: Uuid,
}

/// Review (approve/decline) payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewEnrollment {
    pub approve: bool,
}
