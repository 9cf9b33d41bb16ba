//! Event management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::event::{CreateEvent, Event},
    repository::{EventStore, Repository},
};

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
}

impl EventsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, teacher_id: Uuid, event: CreateEvent) -> AppResult<Event> {
        if event.end_time <= event.start_time {
            return Err(AppError::Validation(
                "end_time must be after start_time".to_string(),
            ));
        }
        if event.radius <= 0.0 || !event.radius.is_finite() {
            return Err(AppError::Validation(
                "radius must be a positive number of meters".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&event.latitude)
            || !(-180.0..=180.0).contains(&event.longitude)
        {
            return Err(AppError::Validation("invalid coordinates".to_string()));
        }

        self.repository.events.create(teacher_id, &event).await
    }

    pub async fn get(&self, event_id: Uuid) -> AppResult<Event> {
        self.repository
            .events
            .get(event_id)
            .await?
            .ok_or(AppError::EventNotFound)
    }

    pub async fn list(&self, active_only: bool) -> AppResult<Vec<Event>> {
        self.repository.events.list(active_only).await
    }

    pub async fn deactivate(&self, event_id: Uuid) -> AppResult<()> {
        if !self.repository.events.deactivate(event_id).await? {
            return Err(AppError::EventNotFound);
        }
        Ok(())
    }

    /// Delete an event and, by cascade, its attendance records
    pub async fn delete(&self, event_id: Uuid) -> AppResult<()> {
        if !self.repository.events.delete(event_id).await? {
            return Err(AppError::EventNotFound);
        }
        Ok(())
    }
}
