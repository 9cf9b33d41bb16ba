//! Business logic services

pub mod attendance;
pub mod auth;
pub mod enrollments;
pub mod events;
pub mod face;
pub mod window;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, FaceConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub events: events::EventsService,
    pub enrollments: enrollments::EnrollmentsService,
    pub attendance: attendance::AttendanceService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, face_config: FaceConfig) -> Self {
        let matcher = Arc::new(face::CosineFaceMatcher::new(face_config.tolerance));

        let attendance = attendance::AttendanceService::new(
            Arc::new(repository.events.clone()),
            Arc::new(repository.attendance.clone()),
            Arc::new(repository.enrollments.clone()),
            Arc::new(repository.users.clone()),
            matcher,
        );

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            events: events::EventsService::new(repository.clone()),
            enrollments: enrollments::EnrollmentsService::new(repository),
            attendance,
        }
    }
}
