//! Enrollments repository for database operations

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::enrollment::{Enrollment, ENROLLMENT_APPROVED, ENROLLMENT_PENDING},
    repository::EnrollmentStore,
};

#[derive(Clone)]
pub struct EnrollmentsRepository {
    pool: Pool<Postgres>,
}

impl EnrollmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a pending enrollment request
    pub async fn create(
        &self,
        user_id: Uuid,
        department_id: Uuid,
        requested_at: NaiveDateTime,
    ) -> AppResult<Enrollment> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (id, user_id, department_id, status, requested_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(department_id)
        .bind(ENROLLMENT_PENDING)
        .bind(requested_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(enrollment)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        let enrollment =
            sqlx::query_as::<_, Enrollment>("SELECT * FROM enrollments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(enrollment)
    }

    /// Find an enrollment for a (user, department) pair regardless of status
    pub async fn find(
        &self,
        user_id: Uuid,
        department_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE user_id = $1 AND department_id = $2",
        )
        .bind(user_id)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }

    /// List pending requests for a department
    pub async fn list_pending(&self, department_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE department_id = $1 AND status = 'pending' \
             ORDER BY requested_at",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }

    /// List a student's own enrollment requests
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE user_id = $1 ORDER BY requested_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }

    /// Remove an enrollment entirely (cancel/leave)
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record an approve/decline decision
    pub async fn review(
        &self,
        id: Uuid,
        status: &str,
        reviewed_by: Uuid,
        reviewed_at: NaiveDateTime,
    ) -> AppResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET status = $2, reviewed_by = $3, reviewed_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewed_by)
        .bind(reviewed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }
}

#[async_trait]
impl EnrollmentStore for EnrollmentsRepository {
    async fn list_approved(&self, department_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE department_id = $1 AND status = $2",
        )
        .bind(department_id)
        .bind(ENROLLMENT_APPROVED)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }
}
