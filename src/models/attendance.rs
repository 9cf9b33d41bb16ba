//! Attendance record model and reporting types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Overall attendance classification
pub const STATUS_PRESENT: &str = "Present";
pub const STATUS_ABSENT: &str = "Absent";

/// One attendance record per (student, event) pair.
///
/// `check_out_time` is only ever set after `check_in_time`; both are
/// write-once. The (student_id, event_id) pair is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub event_id: Uuid,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_in_status: Option<String>,
    pub check_out_time: Option<NaiveDateTime>,
    pub check_out_status: Option<String>,
    /// "Present" once checked in, "Absent" when written by finalization
    pub status: String,
    /// Instant the record was created
    pub timestamp: NaiveDateTime,
}

/// Per-student check-in/check-out status for the current user
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceStatusInfo {
    pub has_checked_in: bool,
    pub has_checked_out: bool,
}

/// One row of the cohort attendance view for an event.
///
/// Roster members without an attendance record appear as "Absent" with
/// null timestamps. Students missing from the user store keep placeholder
/// display fields rather than failing the view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceViewRow {
    pub attendance_id: Option<Uuid>,
    pub student_id: Uuid,
    pub status: String,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub student_name: String,
    pub student_email: String,
    pub student_id_number: String,
    pub student_first_name: String,
    pub student_last_name: String,
}

/// Result of finalizing an event's attendance
#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
pub struct FinalizeSummary {
    pub total_enrolled: usize,
    pub present_count: usize,
    /// Absent records written by this finalize call; zero when re-run
    pub absent_count: usize,
}
