//! Events repository for database operations

use async_trait::async_trait;
use chrono::Local;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::event::{CreateEvent, Event},
    repository::EventStore,
};

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Postgres>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new event owned by the given teacher
    pub async fn create(&self, teacher_id: Uuid, event: &CreateEvent) -> AppResult<Event> {
        let created = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events
                (id, name, teacher_id, department_id, latitude, longitude, radius,
                 start_time, end_time, check_in_start, check_in_end,
                 check_out_start, check_out_end, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.name)
        .bind(teacher_id)
        .bind(event.department_id)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.radius)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.check_in_start)
        .bind(event.check_in_end)
        .bind(event.check_out_start)
        .bind(event.check_out_end)
        .bind(Local::now().naive_local())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// List events, optionally restricted to active ones
    pub async fn list(&self, active_only: bool) -> AppResult<Vec<Event>> {
        let query = if active_only {
            "SELECT * FROM events WHERE is_active ORDER BY start_time DESC"
        } else {
            "SELECT * FROM events ORDER BY start_time DESC"
        };

        let events = sqlx::query_as::<_, Event>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Hide an event from students without deleting its attendance
    pub async fn deactivate(&self, event_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE events SET is_active = FALSE WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete an event; attendance rows cascade with it
    pub async fn delete(&self, event_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl EventStore for EventsRepository {
    async fn get(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }
}
