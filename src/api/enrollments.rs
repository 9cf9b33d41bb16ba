//! Enrollment workflow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::enrollment::{CreateEnrollment, Enrollment, ReviewEnrollment},
    AppState,
};

use super::AuthenticatedUser;

/// Request enrollment in a department
#[utoipa::path(
    post,
    path = "/enrollments",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    request_body = CreateEnrollment,
    responses(
        (status = 201, description = "Enrollment requested", body = Enrollment),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Already requested or enrolled")
    )
)]
pub async fn request_enrollment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEnrollment>,
) -> AppResult<(StatusCode, Json<Enrollment>)> {
    let enrollment = state
        .services
        .enrollments
        .request(claims.sub, request.department_id)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Current user's enrollment requests
#[utoipa::path(
    get,
    path = "/enrollments",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own enrollments", body = Vec<Enrollment>)
    )
)]
pub async fn list_my_enrollments(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Enrollment>>> {
    let enrollments = state.services.enrollments.list_mine(claims.sub).await?;
    Ok(Json(enrollments))
}

/// Pending requests for a department (teachers only)
#[utoipa::path(
    get,
    path = "/enrollments/pending/{department_id}",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    params(
        ("department_id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Pending enrollments", body = Vec<Enrollment>),
        (status = 403, description = "Not a teacher")
    )
)]
pub async fn list_pending(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(department_id): Path<Uuid>,
) -> AppResult<Json<Vec<Enrollment>>> {
    claims.require_teacher()?;

    let enrollments = state
        .services
        .enrollments
        .list_pending(department_id)
        .await?;

    Ok(Json(enrollments))
}

/// Approved enrollments for a department (teachers only)
#[utoipa::path(
    get,
    path = "/enrollments/approved/{department_id}",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    params(
        ("department_id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Approved enrollments", body = Vec<Enrollment>),
        (status = 403, description = "Not a teacher")
    )
)]
pub async fn list_approved(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(department_id): Path<Uuid>,
) -> AppResult<Json<Vec<Enrollment>>> {
    claims.require_teacher()?;

    let enrollments = state
        .services
        .enrollments
        .list_approved(department_id)
        .await?;

    Ok(Json(enrollments))
}

/// Cancel an own pending request, or leave a society (teachers)
#[utoipa::path(
    delete,
    path = "/enrollments/{id}",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 204, description = "Enrollment cancelled"),
        (status = 400, description = "Enrollment cannot be cancelled"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(enrollment_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .enrollments
        .cancel(enrollment_id, claims.sub, claims.is_teacher())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Approve or decline a pending request (teachers only)
#[utoipa::path(
    put,
    path = "/enrollments/{id}/review",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Enrollment ID")
    ),
    request_body = ReviewEnrollment,
    responses(
        (status = 200, description = "Enrollment reviewed", body = Enrollment),
        (status = 403, description = "Not a teacher"),
        (status = 404, description = "Enrollment not found"),
        (status = 409, description = "Already reviewed")
    )
)]
pub async fn review_enrollment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(enrollment_id): Path<Uuid>,
    Json(request): Json<ReviewEnrollment>,
) -> AppResult<Json<Enrollment>> {
    claims.require_teacher()?;

    let enrollment = state
        .services
        .enrollments
        .review(enrollment_id, claims.sub, request.approve)
        .await?;

    Ok(Json(enrollment))
}
