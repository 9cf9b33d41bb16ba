//! Attendance endpoints: check-in, check-out, status, cohort views

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::attendance::{
        AttendanceRecord, AttendanceStatusInfo, AttendanceViewRow, FinalizeSummary,
    },
    AppState,
};

use super::{auth::decode_sample, AuthenticatedUser};

/// Check-in/check-out request payload
#[derive(Deserialize, ToSchema)]
pub struct CheckRequest {
    pub event_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    /// Optional base64-encoded face sample for identity verification
    pub face_sample: Option<String>,
}

/// Successful transition response
#[derive(Serialize, ToSchema)]
pub struct CheckResponse {
    pub status: String,
    pub message: String,
    pub attendance: AttendanceRecord,
}

/// Cohort attendance view for an event
#[derive(Serialize, ToSchema)]
pub struct EventAttendanceResponse {
    pub event_id: Uuid,
    pub total: usize,
    pub attendance: Vec<AttendanceViewRow>,
}

/// Check in to an event
#[utoipa::path(
    post,
    path = "/attendance/checkin",
    tag = "attendance",
    security(("bearer_auth" = [])),
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Checked in", body = CheckResponse),
        (status = 400, description = "Window closed, out of range, or face rejected"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Already checked in")
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CheckRequest>,
) -> AppResult<Json<CheckResponse>> {
    let sample = request
        .face_sample
        .as_deref()
        .map(decode_sample)
        .transpose()?;

    let (attendance, message) = state
        .services
        .attendance
        .check_in(
            claims.sub,
            request.event_id,
            request.latitude,
            request.longitude,
            sample.as_deref(),
        )
        .await?;

    Ok(Json(CheckResponse {
        status: "Success".to_string(),
        message,
        attendance,
    }))
}

/// Check out from an event
#[utoipa::path(
    post,
    path = "/attendance/checkout",
    tag = "attendance",
    security(("bearer_auth" = [])),
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Checked out", body = CheckResponse),
        (status = 400, description = "Window closed, out of range, or face rejected"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Not checked in, or already checked out")
    )
)]
pub async fn check_out(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CheckRequest>,
) -> AppResult<Json<CheckResponse>> {
    let sample = request
        .face_sample
        .as_deref()
        .map(decode_sample)
        .transpose()?;

    let (attendance, message) = state
        .services
        .attendance
        .check_out(
            claims.sub,
            request.event_id,
            request.latitude,
            request.longitude,
            sample.as_deref(),
        )
        .await?;

    Ok(Json(CheckResponse {
        status: "Success".to_string(),
        message,
        attendance,
    }))
}

/// Current user's check-in/check-out status for an event
#[utoipa::path(
    get,
    path = "/attendance/status/{event_id}",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Attendance status", body = AttendanceStatusInfo)
    )
)]
pub async fn get_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<AttendanceStatusInfo>> {
    let status = state
        .services
        .attendance
        .get_status(claims.sub, event_id)
        .await?;

    Ok(Json(status))
}

/// Current user's attendance history
#[utoipa::path(
    get,
    path = "/attendance/history",
    tag = "attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance history", body = Vec<AttendanceRecord>)
    )
)]
pub async fn history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let records = state.services.attendance.history(claims.sub).await?;
    Ok(Json(records))
}

/// Full cohort attendance view for an event (teachers only)
#[utoipa::path(
    get,
    path = "/attendance/event/{event_id}",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Cohort attendance view", body = EventAttendanceResponse),
        (status = 403, description = "Not a teacher")
    )
)]
pub async fn event_attendance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventAttendanceResponse>> {
    claims.require_teacher()?;

    let attendance = state
        .services
        .attendance
        .event_attendance_view(event_id)
        .await?;

    Ok(Json(EventAttendanceResponse {
        event_id,
        total: attendance.len(),
        attendance,
    }))
}

/// Finalize an event: back-fill Absent records for no-shows (teachers only)
#[utoipa::path(
    post,
    path = "/attendance/event/{event_id}/finalize",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Finalize summary", body = FinalizeSummary),
        (status = 403, description = "Not a teacher"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn finalize(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<FinalizeSummary>> {
    claims.require_teacher()?;

    let summary = state.services.attendance.finalize(event_id).await?;
    Ok(Json(summary))
}
