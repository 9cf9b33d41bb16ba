//! Event model and related types
//!
//! All scheduling instants are naive local time. The deployment assumes a
//! single wall-clock zone; no timezone conversion happens anywhere in the
//! attendance logic.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Event model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub teacher_id: Uuid,
    pub department_id: Option<Uuid>,
    /// Geofence center latitude, degrees
    pub latitude: f64,
    /// Geofence center longitude, degrees
    pub longitude: f64,
    /// Geofence radius, meters
    pub radius: f64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Explicit check-in window; falls back to [start_time, end_time]
    pub check_in_start: Option<NaiveDateTime>,
    pub check_in_end: Option<NaiveDateTime>,
    /// Explicit check-out window; falls back to [end_time, unbounded)
    pub check_out_start: Option<NaiveDateTime>,
    pub check_out_end: Option<NaiveDateTime>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Create event request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEvent {
    pub name: String,
    pub department_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub check_in_start: Option<NaiveDateTime>,
    pub check_in_end: Option<NaiveDateTime>,
    pub check_out_start: Option<NaiveDateTime>,
    pub check_out_end: Option<NaiveDateTime>,
}
