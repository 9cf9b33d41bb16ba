//! Event management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        department::{CreateDepartment, Department},
        event::{CreateEvent, Event},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Event listing filters
#[derive(Deserialize, IntoParams)]
pub struct ListEventsQuery {
    /// Include inactive events (teachers only see these)
    pub include_inactive: Option<bool>,
}

/// Create a new event (teachers only)
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid schedule or coordinates"),
        (status = 403, description = "Not a teacher")
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<Event>)> {
    claims.require_teacher()?;

    let event = state.services.events.create(claims.sub, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List events
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Events", body = Vec<Event>)
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<Vec<Event>>> {
    // Students only ever see active events
    let active_only = !claims.is_teacher() || !query.include_inactive.unwrap_or(false);

    let events = state.services.events.list(active_only).await?;
    Ok(Json(events))
}

/// Get a single event
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Event>> {
    let event = state.services.events.get(event_id).await?;
    Ok(Json(event))
}

/// Deactivate an event (teachers only)
#[utoipa::path(
    put,
    path = "/events/{id}/deactivate",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deactivated"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn deactivate_event(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_teacher()?;

    state.services.events.deactivate(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an event and its attendance records (teachers only)
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_teacher()?;

    state.services.events.delete(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a department (admins only)
#[utoipa::path(
    post,
    path = "/departments",
    tag = "departments",
    security(("bearer_auth" = [])),
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn create_department(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateDepartment>,
) -> AppResult<(StatusCode, Json<Department>)> {
    claims.require_admin()?;

    let department = state
        .services
        .enrollments
        .create_department(&request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// Rename a department (admins only)
#[utoipa::path(
    put,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    request_body = CreateDepartment,
    responses(
        (status = 204, description = "Department updated"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Department not found")
    )
)]
pub async fn update_department(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(department_id): Path<Uuid>,
    Json(request): Json<CreateDepartment>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .enrollments
        .update_department(department_id, &request.name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a department (admins only)
#[utoipa::path(
    delete,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Department ID")
    ),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Department not found")
    )
)]
pub async fn delete_department(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(department_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .enrollments
        .delete_department(department_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List departments
#[utoipa::path(
    get,
    path = "/departments",
    tag = "departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Departments", body = Vec<Department>)
    )
)]
pub async fn list_departments(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Department>>> {
    let departments = state.services.enrollments.list_departments().await?;
    Ok(Json(departments))
}
