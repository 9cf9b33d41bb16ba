//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{attendance, auth, enrollments, events, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presenza API",
        version = "0.3.0",
        description = "Location-based attendance tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::register_face,
        // Events & departments
        events::create_event,
        events::list_events,
        events::get_event,
        events::deactivate_event,
        events::delete_event,
        events::create_department,
        events::update_department,
        events::delete_department,
        events::list_departments,
        // Enrollments
        enrollments::request_enrollment,
        enrollments::list_my_enrollments,
        enrollments::list_pending,
        enrollments::list_approved,
        enrollments::review_enrollment,
        enrollments::cancel_enrollment,
        // Admin
        users::list_users,
        users::get_user,
        users::update_user,
        // Attendance
        attendance::check_in,
        attendance::check_out,
        attendance::get_status,
        attendance::history,
        attendance::event_attendance,
        attendance::finalize,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::UserProfile,
            crate::models::user::UpdateUser,
            auth::LoginResponse,
            auth::RegisterFaceRequest,
            // Events & departments
            crate::models::event::Event,
            crate::models::event::CreateEvent,
            crate::models::department::Department,
            crate::models::department::CreateDepartment,
            // Enrollments
            crate::models::enrollment::Enrollment,
            crate::models::enrollment::CreateEnrollment,
            crate::models::enrollment::ReviewEnrollment,
            // Attendance
            crate::models::attendance::AttendanceRecord,
            crate::models::attendance::AttendanceStatusInfo,
            crate::models::attendance::AttendanceViewRow,
            crate::models::attendance::FinalizeSummary,
            attendance::CheckRequest,
            attendance::CheckResponse,
            attendance::EventAttendanceResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and face registration"),
        (name = "events", description = "Event management"),
        (name = "departments", description = "Department management"),
        (name = "enrollments", description = "Enrollment workflow"),
        (name = "admin", description = "Administrative user management"),
        (name = "attendance", description = "Check-in, check-out and cohort views")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
