//! Error types for Presenza server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Application error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchEvent = 4,
    WindowNotOpen = 5,
    WindowEnded = 6,
    AlreadyCheckedIn = 7,
    AlreadyCheckedOut = 8,
    MustCheckInFirst = 9,
    OutOfRange = 10,
    FaceNotRegistered = 11,
    FaceMismatch = 12,
    NoFaceDetected = 13,
    MultipleFacesDetected = 14,
    NoSuchData = 15,
    Duplicate = 16,
    BadValue = 17,
}

/// The action a time window gates, used in user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    CheckIn,
    CheckOut,
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKind::CheckIn => write!(f, "Check-in"),
            WindowKind::CheckOut => write!(f, "Check-out"),
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Event not found")]
    EventNotFound,

    #[error("{kind} is not yet open. Opens at {}", format_opens_at(.opens_at))]
    WindowNotOpen {
        kind: WindowKind,
        opens_at: NaiveDateTime,
    },

    #[error("{0} has ended")]
    WindowEnded(WindowKind),

    #[error("You have already checked in for this event")]
    AlreadyCheckedIn,

    #[error("You have already checked out from this event")]
    AlreadyCheckedOut,

    #[error("You must check in first before checking out")]
    MustCheckInFirst,

    #[error("You are out of range. Please move closer to the event location.")]
    OutOfRange,

    #[error("No registered face found. Please register your face first.")]
    FaceNotRegistered,

    #[error("Face does not match the registered reference")]
    FaceMismatch,

    #[error("No face detected in the submitted sample")]
    NoFaceDetected,

    #[error("Multiple faces detected in the submitted sample")]
    MultipleFacesDetected,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Renders the opening instant the way clients display it, e.g. "3:00 PM".
fn format_opens_at(opens_at: &NaiveDateTime) -> String {
    opens_at.format("%-I:%M %p").to_string()
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::EventNotFound => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchEvent, self.to_string())
            }
            AppError::WindowNotOpen { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::WindowNotOpen, self.to_string())
            }
            AppError::WindowEnded(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::WindowEnded, self.to_string())
            }
            AppError::AlreadyCheckedIn => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyCheckedIn, self.to_string())
            }
            AppError::AlreadyCheckedOut => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyCheckedOut, self.to_string())
            }
            AppError::MustCheckInFirst => {
                (StatusCode::CONFLICT, ErrorCode::MustCheckInFirst, self.to_string())
            }
            AppError::OutOfRange => {
                (StatusCode::BAD_REQUEST, ErrorCode::OutOfRange, self.to_string())
            }
            AppError::FaceNotRegistered => {
                (StatusCode::BAD_REQUEST, ErrorCode::FaceNotRegistered, self.to_string())
            }
            AppError::FaceMismatch => {
                (StatusCode::UNAUTHORIZED, ErrorCode::FaceMismatch, self.to_string())
            }
            AppError::NoFaceDetected => {
                (StatusCode::BAD_REQUEST, ErrorCode::NoFaceDetected, self.to_string())
            }
            AppError::MultipleFacesDetected => {
                (StatusCode::BAD_REQUEST, ErrorCode::MultipleFacesDetected, self.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
