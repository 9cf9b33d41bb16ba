//! Repository layer for database operations
//!
//! The attendance core consumes the store traits defined here; the sqlx
//! repositories are their production implementations. Tests substitute
//! mockall mocks so the decision logic runs against fixed data.

pub mod attendance;
pub mod departments;
pub mod enrollments;
pub mod events;
pub mod users;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{attendance::AttendanceRecord, enrollment::Enrollment, event::Event, user::User},
};

/// Read access to event descriptors
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get(&self, event_id: Uuid) -> AppResult<Option<Event>>;
}

/// Attendance record persistence.
///
/// The write methods are conditional: they commit only when the targeted
/// sub-state is still unset, so concurrent transitions for the same
/// (student, event) pair resolve to exactly one winner without external
/// locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find(
        &self,
        student_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<Option<AttendanceRecord>>;

    /// Create or update the record with a check-in, only if no check-in is
    /// recorded yet. Returns `None` when a concurrent check-in won.
    async fn upsert_check_in(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<Option<AttendanceRecord>>;

    /// Record a check-out, only if checked in and not yet checked out.
    /// Returns `None` when the condition does not hold.
    async fn upsert_check_out(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<Option<AttendanceRecord>>;

    /// Insert an Absent record unless any record already exists for the
    /// pair. Returns whether a row was written.
    async fn insert_absent_if_missing(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<bool>;

    async fn list_by_event(&self, event_id: Uuid) -> AppResult<Vec<AttendanceRecord>>;

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<AttendanceRecord>>;
}

/// Read access to approved enrollments (roster building)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn list_approved(&self, department_id: Uuid) -> AppResult<Vec<Enrollment>>;
}

/// Read access to user profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<User>>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub events: events::EventsRepository,
    pub attendance: attendance::AttendanceRepository,
    pub enrollments: enrollments::EnrollmentsRepository,
    pub users: users::UsersRepository,
    pub departments: departments::DepartmentsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            events: events::EventsRepository::new(pool.clone()),
            attendance: attendance::AttendanceRepository::new(pool.clone()),
            enrollments: enrollments::EnrollmentsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            departments: departments::DepartmentsRepository::new(pool.clone()),
            pool,
        }
    }
}
