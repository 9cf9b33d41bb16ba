//! Attendance repository for database operations
//!
//! Check-in and check-out writes are single conditional statements rather
//! than read-then-write sequences, so the uniqueness invariant holds under
//! concurrent requests.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::attendance::{AttendanceRecord, STATUS_ABSENT, STATUS_PRESENT},
    repository::AttendanceStore,
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: Pool<Postgres>,
}

impl AttendanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for AttendanceRepository {
    async fn find(
        &self,
        student_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE student_id = $1 AND event_id = $2",
        )
        .bind(student_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_check_in(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<Option<AttendanceRecord>> {
        // The WHERE clause on the conflict arm makes this a compare-and-set:
        // a row whose check_in_time is already set is left untouched and no
        // row comes back.
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance
                (id, student_id, event_id, check_in_time, check_in_status, status, timestamp)
            VALUES ($1, $2, $3, $4, $5, $5, $4)
            ON CONFLICT (student_id, event_id) DO UPDATE
                SET check_in_time = EXCLUDED.check_in_time,
                    check_in_status = EXCLUDED.check_in_status,
                    status = EXCLUDED.status
                WHERE attendance.check_in_time IS NULL
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(event_id)
        .bind(at)
        .bind(STATUS_PRESENT)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_check_out(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance
            SET check_out_time = $3, check_out_status = $4
            WHERE student_id = $1 AND event_id = $2
              AND check_in_time IS NOT NULL
              AND check_out_time IS NULL
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(event_id)
        .bind(at)
        .bind(STATUS_PRESENT)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_absent_if_missing(
        &self,
        student_id: Uuid,
        event_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (id, student_id, event_id, status, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, event_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(event_id)
        .bind(STATUS_ABSENT)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_event(&self, event_id: Uuid) -> AppResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_by_student(&self, student_id: Uuid) -> AppResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE student_id = $1 ORDER BY timestamp DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
