//! Attendance check-in/check-out state machine and cohort reconciliation
//!
//! Per (student, event) pair the record moves one way only:
//! not-checked-in -> checked-in -> checked-out. Every transition is gated on
//! the event's time window, the geofence, and (when a sample is submitted)
//! face verification, then committed with a conditional store write so
//! concurrent duplicates resolve to a single winner.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, WindowKind},
    geo::{self, GeoPoint},
    models::{
        attendance::{
            AttendanceRecord, AttendanceStatusInfo, AttendanceViewRow, FinalizeSummary,
            STATUS_ABSENT, STATUS_PRESENT,
        },
        event::Event,
        user::User,
    },
    repository::{AttendanceStore, EnrollmentStore, EventStore, UserStore},
    services::face::FaceMatcher,
    services::window::{self, WindowDecision},
};

#[derive(Clone)]
pub struct AttendanceService {
    events: Arc<dyn EventStore>,
    attendance: Arc<dyn AttendanceStore>,
    enrollments: Arc<dyn EnrollmentStore>,
    users: Arc<dyn UserStore>,
    face: Arc<dyn FaceMatcher>,
}

impl AttendanceService {
    pub fn new(
        events: Arc<dyn EventStore>,
        attendance: Arc<dyn AttendanceStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        users: Arc<dyn UserStore>,
        face: Arc<dyn FaceMatcher>,
    ) -> Self {
        Self {
            events,
            attendance,
            enrollments,
            users,
            face,
        }
    }

    /// Check a student in to an event.
    ///
    /// Gates, in order: event existence, check-in window, prior check-in,
    /// geofence, face verification. Nothing is written when any gate
    /// rejects.
    pub async fn check_in(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        latitude: f64,
        longitude: f64,
        face_sample: Option<&[u8]>,
    ) -> AppResult<(AttendanceRecord, String)> {
        let now = Local::now().naive_local();
        let event = self
            .events
            .get(event_id)
            .await?
            .ok_or(AppError::EventNotFound)?;

        match window::check_in_allowed(&event, now) {
            WindowDecision::Allowed => {}
            WindowDecision::NotYetOpen(opens_at) => {
                return Err(AppError::WindowNotOpen {
                    kind: WindowKind::CheckIn,
                    opens_at,
                });
            }
            WindowDecision::Ended => return Err(AppError::WindowEnded(WindowKind::CheckIn)),
        }

        if let Some(existing) = self.attendance.find(student_id, event_id).await? {
            if existing.check_in_time.is_some() {
                tracing::debug!(
                    "student {} already checked in for event {}",
                    student_id,
                    event.name
                );
                return Err(AppError::AlreadyCheckedIn);
            }
        }

        self.require_within_geofence(&event, latitude, longitude)?;

        if let Some(sample) = face_sample {
            self.verify_face(student_id, sample).await?;
        }

        // Conditional upsert: a concurrent check-in that commits first
        // leaves this one empty-handed.
        let record = self
            .attendance
            .upsert_check_in(student_id, event_id, now)
            .await?
            .ok_or(AppError::AlreadyCheckedIn)?;

        tracing::info!(
            "student {} checked in to event {} ({})",
            student_id,
            event.name,
            event_id
        );

        Ok((record, "Checked in successfully".to_string()))
    }

    /// Check a student out of an event.
    ///
    /// Requires an existing check-in; never alters the check-in sub-state.
    pub async fn check_out(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        latitude: f64,
        longitude: f64,
        face_sample: Option<&[u8]>,
    ) -> AppResult<(AttendanceRecord, String)> {
        let now = Local::now().naive_local();
        let event = self
            .events
            .get(event_id)
            .await?
            .ok_or(AppError::EventNotFound)?;

        match window::check_out_allowed(&event, now) {
            WindowDecision::Allowed => {}
            WindowDecision::NotYetOpen(opens_at) => {
                return Err(AppError::WindowNotOpen {
                    kind: WindowKind::CheckOut,
                    opens_at,
                });
            }
            WindowDecision::Ended => return Err(AppError::WindowEnded(WindowKind::CheckOut)),
        }

        let existing = self.attendance.find(student_id, event_id).await?;
        match existing {
            None => return Err(AppError::MustCheckInFirst),
            Some(ref record) if record.check_in_time.is_none() => {
                return Err(AppError::MustCheckInFirst);
            }
            Some(ref record) if record.check_out_time.is_some() => {
                return Err(AppError::AlreadyCheckedOut);
            }
            Some(_) => {}
        }

        self.require_within_geofence(&event, latitude, longitude)?;

        if let Some(sample) = face_sample {
            self.verify_face(student_id, sample).await?;
        }

        let record = self
            .attendance
            .upsert_check_out(student_id, event_id, now)
            .await?
            .ok_or(AppError::AlreadyCheckedOut)?;

        tracing::info!(
            "student {} checked out of event {} ({})",
            student_id,
            event.name,
            event_id
        );

        Ok((record, "Checked out successfully".to_string()))
    }

    /// Check-in/check-out status for a single (student, event) pair
    pub async fn get_status(
        &self,
        student_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<AttendanceStatusInfo> {
        let record = self.attendance.find(student_id, event_id).await?;

        Ok(AttendanceStatusInfo {
            has_checked_in: record
                .as_ref()
                .map(|r| r.check_in_time.is_some())
                .unwrap_or(false),
            has_checked_out: record
                .as_ref()
                .map(|r| r.check_out_time.is_some())
                .unwrap_or(false),
        })
    }

    /// A student's attendance history across events
    pub async fn history(&self, student_id: Uuid) -> AppResult<Vec<AttendanceRecord>> {
        self.attendance.list_by_student(student_id).await
    }

    /// Full cohort view for an event: every approved roster member,
    /// defaulted Absent, overlaid with actual attendance rows and joined
    /// with student display fields.
    ///
    /// Returns an empty view when the event does not exist. Missing user
    /// profiles degrade to placeholder fields instead of failing the view.
    pub async fn event_attendance_view(
        &self,
        event_id: Uuid,
    ) -> AppResult<Vec<AttendanceViewRow>> {
        let Some(event) = self.events.get(event_id).await? else {
            return Ok(Vec::new());
        };

        let mut entries: HashMap<Uuid, AttendanceViewRow> = HashMap::new();

        if let Some(department_id) = event.department_id {
            for enrollment in self.enrollments.list_approved(department_id).await? {
                entries.insert(
                    enrollment.user_id,
                    AttendanceViewRow {
                        attendance_id: None,
                        student_id: enrollment.user_id,
                        status: STATUS_ABSENT.to_string(),
                        check_in_time: None,
                        check_out_time: None,
                        student_name: String::new(),
                        student_email: String::new(),
                        student_id_number: String::new(),
                        student_first_name: String::new(),
                        student_last_name: String::new(),
                    },
                );
            }
        }

        // Stray rows from students outside the roster are dropped when the
        // event belongs to a department; without one, every row counts.
        for record in self.attendance.list_by_event(event_id).await? {
            if event.department_id.is_some() && !entries.contains_key(&record.student_id) {
                continue;
            }
            entries.insert(
                record.student_id,
                AttendanceViewRow {
                    attendance_id: Some(record.id),
                    student_id: record.student_id,
                    status: record.status.clone(),
                    check_in_time: record.check_in_time,
                    check_out_time: record.check_out_time,
                    student_name: String::new(),
                    student_email: String::new(),
                    student_id_number: String::new(),
                    student_first_name: String::new(),
                    student_last_name: String::new(),
                },
            );
        }

        let mut rows = Vec::with_capacity(entries.len());
        for (student_id, mut row) in entries {
            match self.users.get(student_id).await? {
                Some(user) => {
                    row.student_name = format!("{} {}", user.first_name, user.last_name);
                    row.student_email = user.email;
                    row.student_id_number = user.id_number;
                    row.student_first_name = user.first_name;
                    row.student_last_name = user.last_name;
                }
                None => {
                    row.student_name = "Unknown".to_string();
                    row.student_email = "Unknown".to_string();
                    row.student_id_number = "N/A".to_string();
                }
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// Back-fill Absent records for roster members with no attendance row.
    ///
    /// Idempotent: the insert is conditioned on no record existing, so a
    /// second run (or a check-in racing the backfill) never produces a
    /// duplicate.
    pub async fn finalize(&self, event_id: Uuid) -> AppResult<FinalizeSummary> {
        let event = self
            .events
            .get(event_id)
            .await?
            .ok_or(AppError::EventNotFound)?;

        let Some(department_id) = event.department_id else {
            return Ok(FinalizeSummary {
                total_enrolled: 0,
                present_count: 0,
                absent_count: 0,
            });
        };

        let roster = self.enrollments.list_approved(department_id).await?;
        let records = self.attendance.list_by_event(event_id).await?;

        let present: HashSet<Uuid> = records
            .iter()
            .filter(|r| r.status == STATUS_PRESENT)
            .map(|r| r.student_id)
            .collect();
        let recorded: HashSet<Uuid> = records.iter().map(|r| r.student_id).collect();

        let now = Local::now().naive_local();
        let mut absent_count = 0;
        for enrollment in &roster {
            let student_id = enrollment.user_id;
            if present.contains(&student_id) || recorded.contains(&student_id) {
                continue;
            }
            if self
                .attendance
                .insert_absent_if_missing(student_id, event_id, now)
                .await?
            {
                absent_count += 1;
            }
        }

        tracing::info!(
            "finalized event {}: {} enrolled, {} present, {} newly absent",
            event_id,
            roster.len(),
            present.len(),
            absent_count
        );

        Ok(FinalizeSummary {
            total_enrolled: roster.len(),
            present_count: present.len(),
            absent_count,
        })
    }

    /// Extract an embedding from a raw sample using the configured matcher.
    /// Used when registering a reference embedding.
    pub fn extract_embedding(&self, sample: &[u8]) -> AppResult<Vec<f32>> {
        self.face.extract(sample)
    }

    fn require_within_geofence(
        &self,
        event: &Event,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<()> {
        let center = GeoPoint::new(event.latitude, event.longitude);
        let point = GeoPoint::new(latitude, longitude);

        if !geo::is_within_radius(point, center, event.radius) {
            tracing::debug!(
                "rejecting attendance for event {}: {:.2} m exceeds {} m radius",
                event.id,
                geo::distance_meters(point, center),
                event.radius
            );
            return Err(AppError::OutOfRange);
        }

        Ok(())
    }

    /// Verify a submitted sample against the student's registered
    /// reference embedding.
    async fn verify_face(&self, student_id: Uuid, sample: &[u8]) -> AppResult<()> {
        let user: User = self
            .users
            .get(student_id)
            .await?
            .ok_or(AppError::FaceNotRegistered)?;

        let reference = user
            .face_embedding
            .map(|json| json.0)
            .ok_or(AppError::FaceNotRegistered)?;

        let candidate = self.face.extract(sample)?;

        if !self.face.compare(reference, candidate).await? {
            return Err(AppError::FaceMismatch);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enrollment::{Enrollment, ENROLLMENT_APPROVED};
    use crate::repository::{
        MockAttendanceStore, MockEnrollmentStore, MockEventStore, MockUserStore,
    };
    use crate::services::face::MockFaceMatcher;
    use chrono::Duration;
    use mockall::predicate::eq;

    const EVENT_LAT: f64 = 14.5995;
    const EVENT_LON: f64 = 120.9842;

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Event currently inside its check-in window, check-out open after end
    fn open_event(id: Uuid) -> Event {
        Event {
            id,
            name: "Orientation".to_string(),
            teacher_id: Uuid::new_v4(),
            department_id: Some(Uuid::new_v4()),
            latitude: EVENT_LAT,
            longitude: EVENT_LON,
            radius: 50.0,
            start_time: now() - Duration::hours(1),
            end_time: now() + Duration::hours(1),
            check_in_start: None,
            check_in_end: None,
            check_out_start: Some(now() - Duration::minutes(5)),
            check_out_end: None,
            is_active: true,
            created_at: now() - Duration::days(1),
        }
    }

    fn record(student_id: Uuid, event_id: Uuid) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            student_id,
            event_id,
            check_in_time: Some(now()),
            check_in_status: Some(STATUS_PRESENT.to_string()),
            check_out_time: None,
            check_out_status: None,
            status: STATUS_PRESENT.to_string(),
            timestamp: now(),
        }
    }

    fn approved(user_id: Uuid, department_id: Uuid) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            user_id,
            department_id,
            status: ENROLLMENT_APPROVED.to_string(),
            requested_at: now() - Duration::days(7),
            reviewed_at: Some(now() - Duration::days(6)),
            reviewed_by: Some(Uuid::new_v4()),
        }
    }

    fn user(id: Uuid, embedding: Option<Vec<f32>>) -> User {
        User {
            id,
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            id_number: "2021-00123".to_string(),
            email: "maria.santos@example.edu".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: "student".to_string(),
            department_id: None,
            face_embedding: embedding.map(sqlx::types::Json),
            created_at: now() - Duration::days(30),
        }
    }

    struct Mocks {
        events: MockEventStore,
        attendance: MockAttendanceStore,
        enrollments: MockEnrollmentStore,
        users: MockUserStore,
        face: MockFaceMatcher,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                events: MockEventStore::new(),
                attendance: MockAttendanceStore::new(),
                enrollments: MockEnrollmentStore::new(),
                users: MockUserStore::new(),
                face: MockFaceMatcher::new(),
            }
        }

        fn into_service(self) -> AttendanceService {
            AttendanceService::new(
                Arc::new(self.events),
                Arc::new(self.attendance),
                Arc::new(self.enrollments),
                Arc::new(self.users),
                Arc::new(self.face),
            )
        }
    }

    #[tokio::test]
    async fn test_check_in_success_at_event_location() {
        let event_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .with(eq(event_id))
            .returning(move |id| Ok(Some(open_event(id))));
        mocks
            .attendance
            .expect_find()
            .returning(|_, _| Ok(None));
        mocks
            .attendance
            .expect_upsert_check_in()
            .with(eq(student_id), eq(event_id), mockall::predicate::always())
            .returning(|s, e, _| Ok(Some(record(s, e))));

        let service = mocks.into_service();
        let (committed, message) = service
            .check_in(student_id, event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap();

        assert_eq!(committed.status, STATUS_PRESENT);
        assert!(committed.check_in_time.is_some());
        assert_eq!(message, "Checked in successfully");
    }

    #[tokio::test]
    async fn test_check_in_unknown_event() {
        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(|_| Ok(None));

        let service = mocks.into_service();
        let err = service
            .check_in(Uuid::new_v4(), Uuid::new_v4(), EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EventNotFound));
    }

    #[tokio::test]
    async fn test_check_in_before_window_opens() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.check_in_start = Some(now() + Duration::hours(1));
            event.check_in_end = Some(now() + Duration::hours(2));
            Ok(Some(event))
        });

        let service = mocks.into_service();
        let err = service
            .check_in(Uuid::new_v4(), event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::WindowNotOpen {
                kind: WindowKind::CheckIn,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_check_in_after_window_ends() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.check_in_end = Some(now() - Duration::minutes(30));
            Ok(Some(event))
        });

        let service = mocks.into_service();
        let err = service
            .check_in(Uuid::new_v4(), event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::WindowEnded(WindowKind::CheckIn)));
    }

    #[tokio::test]
    async fn test_check_in_twice_rejected() {
        let event_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks
            .attendance
            .expect_find()
            .returning(|s, e| Ok(Some(record(s, e))));

        let service = mocks.into_service();
        let err = service
            .check_in(student_id, event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyCheckedIn));
    }

    #[tokio::test]
    async fn test_check_in_out_of_range() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|_, _| Ok(None));
        // No upsert expectation: an out-of-range attempt must not write.

        let service = mocks.into_service();
        // ~200 m north of the 50 m geofence
        let err = service
            .check_in(
                Uuid::new_v4(),
                event_id,
                EVENT_LAT + 0.0018,
                EVENT_LON,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OutOfRange));
    }

    #[tokio::test]
    async fn test_check_in_loses_concurrent_race() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|_, _| Ok(None));
        // The conditional write reports a concurrent winner
        mocks
            .attendance
            .expect_upsert_check_in()
            .returning(|_, _, _| Ok(None));

        let service = mocks.into_service();
        let err = service
            .check_in(Uuid::new_v4(), event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyCheckedIn));
    }

    #[tokio::test]
    async fn test_face_gated_check_in_without_registration() {
        let event_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|_, _| Ok(None));
        mocks
            .users
            .expect_get()
            .with(eq(student_id))
            .returning(|id| Ok(Some(user(id, None))));

        let service = mocks.into_service();
        let err = service
            .check_in(student_id, event_id, EVENT_LAT, EVENT_LON, Some(b"[0.1]"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::FaceNotRegistered));
    }

    #[tokio::test]
    async fn test_face_gated_check_in_mismatch() {
        let event_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|_, _| Ok(None));
        mocks
            .users
            .expect_get()
            .returning(|id| Ok(Some(user(id, Some(vec![1.0, 0.0])))));
        mocks
            .face
            .expect_extract()
            .returning(|_| Ok(vec![0.0, 1.0]));
        mocks.face.expect_compare().returning(|_, _| Ok(false));

        let service = mocks.into_service();
        let err = service
            .check_in(student_id, event_id, EVENT_LAT, EVENT_LON, Some(b"[0,1]"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::FaceMismatch));
    }

    #[tokio::test]
    async fn test_face_gated_check_in_match_commits() {
        let event_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|_, _| Ok(None));
        mocks
            .users
            .expect_get()
            .returning(|id| Ok(Some(user(id, Some(vec![1.0, 0.0])))));
        mocks
            .face
            .expect_extract()
            .returning(|_| Ok(vec![0.99, 0.01]));
        mocks.face.expect_compare().returning(|_, _| Ok(true));
        mocks
            .attendance
            .expect_upsert_check_in()
            .returning(|s, e, _| Ok(Some(record(s, e))));

        let service = mocks.into_service();
        let (committed, _) = service
            .check_in(student_id, event_id, EVENT_LAT, EVENT_LON, Some(b"[1,0]"))
            .await
            .unwrap();

        assert_eq!(committed.student_id, student_id);
    }

    #[tokio::test]
    async fn test_check_out_before_check_in() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|_, _| Ok(None));

        let service = mocks.into_service();
        let err = service
            .check_out(Uuid::new_v4(), event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MustCheckInFirst));
    }

    #[tokio::test]
    async fn test_check_out_twice_rejected() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks.attendance.expect_find().returning(|s, e| {
            let mut r = record(s, e);
            r.check_out_time = Some(now());
            r.check_out_status = Some(STATUS_PRESENT.to_string());
            Ok(Some(r))
        });

        let service = mocks.into_service();
        let err = service
            .check_out(Uuid::new_v4(), event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyCheckedOut));
    }

    #[tokio::test]
    async fn test_check_out_success() {
        let event_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks
            .events
            .expect_get()
            .returning(move |id| Ok(Some(open_event(id))));
        mocks
            .attendance
            .expect_find()
            .returning(|s, e| Ok(Some(record(s, e))));
        mocks
            .attendance
            .expect_upsert_check_out()
            .returning(|s, e, at| {
                let mut r = record(s, e);
                r.check_out_time = Some(at);
                r.check_out_status = Some(STATUS_PRESENT.to_string());
                Ok(Some(r))
            });

        let service = mocks.into_service();
        let (committed, message) = service
            .check_out(student_id, event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap();

        assert!(committed.check_out_time.is_some());
        assert!(committed.check_in_time.is_some());
        assert_eq!(message, "Checked out successfully");
    }

    #[tokio::test]
    async fn test_check_out_before_window() {
        let event_id = Uuid::new_v4();
        let mut mocks = Mocks::new();

        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.check_out_start = Some(now() + Duration::hours(2));
            Ok(Some(event))
        });

        let service = mocks.into_service();
        let err = service
            .check_out(Uuid::new_v4(), event_id, EVENT_LAT, EVENT_LON, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::WindowNotOpen {
                kind: WindowKind::CheckOut,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_status_reflects_record_state() {
        let mut mocks = Mocks::new();
        mocks
            .attendance
            .expect_find()
            .returning(|s, e| Ok(Some(record(s, e))));

        let service = mocks.into_service();
        let status = service
            .get_status(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(status.has_checked_in);
        assert!(!status.has_checked_out);
    }

    #[tokio::test]
    async fn test_status_without_record() {
        let mut mocks = Mocks::new();
        mocks.attendance.expect_find().returning(|_, _| Ok(None));

        let service = mocks.into_service();
        let status = service
            .get_status(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(!status.has_checked_in);
        assert!(!status.has_checked_out);
    }

    #[tokio::test]
    async fn test_view_missing_event_is_empty() {
        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(|_| Ok(None));

        let service = mocks.into_service();
        let rows = service.event_attendance_view(Uuid::new_v4()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_view_defaults_roster_to_absent() {
        let event_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let students: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let present_student = students[0];

        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = Some(department_id);
            Ok(Some(event))
        });
        let roster = students.clone();
        mocks
            .enrollments
            .expect_list_approved()
            .returning(move |d| Ok(roster.iter().map(|&s| approved(s, d)).collect()));
        mocks
            .attendance
            .expect_list_by_event()
            .returning(move |e| Ok(vec![record(present_student, e)]));
        mocks
            .users
            .expect_get()
            .returning(|id| Ok(Some(user(id, None))));

        let service = mocks.into_service();
        let rows = service.event_attendance_view(event_id).await.unwrap();

        assert_eq!(rows.len(), 3);
        let statuses: HashMap<Uuid, String> = rows
            .iter()
            .map(|r| (r.student_id, r.status.clone()))
            .collect();
        assert_eq!(statuses[&present_student], STATUS_PRESENT);
        assert_eq!(statuses[&students[1]], STATUS_ABSENT);
        assert_eq!(statuses[&students[2]], STATUS_ABSENT);
    }

    #[tokio::test]
    async fn test_view_ignores_stray_rows_for_department_events() {
        let event_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let enrolled = Uuid::new_v4();
        let stray = Uuid::new_v4();

        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = Some(department_id);
            Ok(Some(event))
        });
        mocks
            .enrollments
            .expect_list_approved()
            .returning(move |d| Ok(vec![approved(enrolled, d)]));
        mocks
            .attendance
            .expect_list_by_event()
            .returning(move |e| Ok(vec![record(enrolled, e), record(stray, e)]));
        mocks
            .users
            .expect_get()
            .returning(|id| Ok(Some(user(id, None))));

        let service = mocks.into_service();
        let rows = service.event_attendance_view(event_id).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_id, enrolled);
    }

    #[tokio::test]
    async fn test_view_accepts_all_rows_without_department() {
        let event_id = Uuid::new_v4();
        let walk_in = Uuid::new_v4();

        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = None;
            Ok(Some(event))
        });
        mocks
            .attendance
            .expect_list_by_event()
            .returning(move |e| Ok(vec![record(walk_in, e)]));
        mocks
            .users
            .expect_get()
            .returning(|id| Ok(Some(user(id, None))));

        let service = mocks.into_service();
        let rows = service.event_attendance_view(event_id).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_id, walk_in);
    }

    #[tokio::test]
    async fn test_view_placeholders_for_missing_students() {
        let event_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let ghost = Uuid::new_v4();

        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = Some(department_id);
            Ok(Some(event))
        });
        mocks
            .enrollments
            .expect_list_approved()
            .returning(move |d| Ok(vec![approved(ghost, d)]));
        mocks
            .attendance
            .expect_list_by_event()
            .returning(|_| Ok(Vec::new()));
        mocks.users.expect_get().returning(|_| Ok(None));

        let service = mocks.into_service();
        let rows = service.event_attendance_view(event_id).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_name, "Unknown");
        assert_eq!(rows[0].student_email, "Unknown");
        assert_eq!(rows[0].student_id_number, "N/A");
        assert_eq!(rows[0].status, STATUS_ABSENT);
    }

    #[tokio::test]
    async fn test_finalize_unknown_event() {
        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(|_| Ok(None));

        let service = mocks.into_service();
        let err = service.finalize(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::EventNotFound));
    }

    #[tokio::test]
    async fn test_finalize_without_department_short_circuits() {
        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = None;
            Ok(Some(event))
        });

        let service = mocks.into_service();
        let summary = service.finalize(Uuid::new_v4()).await.unwrap();
        assert_eq!(
            summary,
            FinalizeSummary {
                total_enrolled: 0,
                present_count: 0,
                absent_count: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_finalize_backfills_absences() {
        let event_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let students: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let present_student = students[0];

        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = Some(department_id);
            Ok(Some(event))
        });
        let roster = students.clone();
        mocks
            .enrollments
            .expect_list_approved()
            .returning(move |d| Ok(roster.iter().map(|&s| approved(s, d)).collect()));
        mocks
            .attendance
            .expect_list_by_event()
            .returning(move |e| Ok(vec![record(present_student, e)]));
        mocks
            .attendance
            .expect_insert_absent_if_missing()
            .times(2)
            .returning(|_, _, _| Ok(true));

        let service = mocks.into_service();
        let summary = service.finalize(event_id).await.unwrap();

        assert_eq!(summary.total_enrolled, 3);
        assert_eq!(summary.present_count, 1);
        assert_eq!(summary.absent_count, 2);
    }

    #[tokio::test]
    async fn test_finalize_second_run_inserts_nothing() {
        let event_id = Uuid::new_v4();
        let department_id = Uuid::new_v4();
        let students: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let present_student = students[0];
        let absentees = [students[1], students[2]];

        let mut mocks = Mocks::new();
        mocks.events.expect_get().returning(move |id| {
            let mut event = open_event(id);
            event.department_id = Some(department_id);
            Ok(Some(event))
        });
        let roster = students.clone();
        mocks
            .enrollments
            .expect_list_approved()
            .returning(move |d| Ok(roster.iter().map(|&s| approved(s, d)).collect()));
        // After the first run every roster member has a record
        mocks.attendance.expect_list_by_event().returning(move |e| {
            let mut records = vec![record(present_student, e)];
            for &s in &absentees {
                let mut r = record(s, e);
                r.check_in_time = None;
                r.check_in_status = None;
                r.status = STATUS_ABSENT.to_string();
                records.push(r);
            }
            Ok(records)
        });
        mocks
            .attendance
            .expect_insert_absent_if_missing()
            .times(0);

        let service = mocks.into_service();
        let summary = service.finalize(event_id).await.unwrap();

        assert_eq!(summary.total_enrolled, 3);
        assert_eq!(summary.present_count, 1);
        assert_eq!(summary.absent_count, 0);
    }
}
