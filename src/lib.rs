//! Presenza Attendance Tracking System
//!
//! A REST JSON API for location-based attendance tracking: students check
//! in and out of events by proving GPS proximity (and optionally a face
//! match) within the event's time windows; teachers review and finalize
//! cohort attendance.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    /// Kept alongside the services for readiness probes
    pub pool: sqlx::Pool<sqlx::Postgres>,
}
