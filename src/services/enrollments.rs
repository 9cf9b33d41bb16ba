//! Enrollment workflow: request, approve, decline

use chrono::Local;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        department::Department,
        enrollment::{Enrollment, ENROLLMENT_APPROVED, ENROLLMENT_DECLINED, ENROLLMENT_PENDING},
    },
    repository::{EnrollmentStore, Repository},
};

#[derive(Clone)]
pub struct EnrollmentsService {
    repository: Repository,
}

/// Whether `requester` may cancel this enrollment: owners only, pending
/// requests always, approved memberships only for teachers (leaving a
/// society), declined ones never.
fn cancel_permitted(
    enrollment: &Enrollment,
    requester: Uuid,
    is_teacher: bool,
) -> AppResult<()> {
    if enrollment.user_id != requester {
        return Err(AppError::Authorization(
            "You can only cancel your own enrollments".to_string(),
        ));
    }
    match enrollment.status.as_str() {
        ENROLLMENT_PENDING => Ok(()),
        ENROLLMENT_APPROVED if is_teacher => Ok(()),
        _ => Err(AppError::BadRequest(
            "Cannot cancel this enrollment".to_string(),
        )),
    }
}

impl EnrollmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// A student requests enrollment in a department
    pub async fn request(&self, user_id: Uuid, department_id: Uuid) -> AppResult<Enrollment> {
        if self
            .repository
            .departments
            .get(department_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Department not found".to_string()));
        }

        if let Some(existing) = self
            .repository
            .enrollments
            .find(user_id, department_id)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Enrollment already exists with status '{}'",
                existing.status
            )));
        }

        self.repository
            .enrollments
            .create(user_id, department_id, Local::now().naive_local())
            .await
    }

    /// Approve or decline a pending request
    pub async fn review(
        &self,
        enrollment_id: Uuid,
        reviewer_id: Uuid,
        approve: bool,
    ) -> AppResult<Enrollment> {
        let enrollment = self
            .repository
            .enrollments
            .get(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        if enrollment.status != ENROLLMENT_PENDING {
            return Err(AppError::Conflict(format!(
                "Enrollment already reviewed ({})",
                enrollment.status
            )));
        }

        let status = if approve {
            ENROLLMENT_APPROVED
        } else {
            ENROLLMENT_DECLINED
        };

        self.repository
            .enrollments
            .review(enrollment_id, status, reviewer_id, Local::now().naive_local())
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))
    }

    pub async fn list_pending(&self, department_id: Uuid) -> AppResult<Vec<Enrollment>> {
        self.repository.enrollments.list_pending(department_id).await
    }

    pub async fn list_mine(&self, user_id: Uuid) -> AppResult<Vec<Enrollment>> {
        self.repository.enrollments.list_by_user(user_id).await
    }

    pub async fn list_approved(&self, department_id: Uuid) -> AppResult<Vec<Enrollment>> {
        self.repository.enrollments.list_approved(department_id).await
    }

    /// Cancel a pending request, or leave a society (teachers)
    pub async fn cancel(
        &self,
        enrollment_id: Uuid,
        requester: Uuid,
        is_teacher: bool,
    ) -> AppResult<()> {
        let enrollment = self
            .repository
            .enrollments
            .get(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        cancel_permitted(&enrollment, requester, is_teacher)?;

        if !self.repository.enrollments.delete(enrollment_id).await? {
            return Err(AppError::NotFound("Enrollment not found".to_string()));
        }
        Ok(())
    }

    pub async fn create_department(&self, name: &str) -> AppResult<Department> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "department name must not be empty".to_string(),
            ));
        }
        self.repository.departments.create(name.trim()).await
    }

    pub async fn update_department(&self, id: Uuid, name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "department name must not be empty".to_string(),
            ));
        }
        if !self.repository.departments.update(id, name.trim()).await? {
            return Err(AppError::NotFound("Department not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete_department(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.departments.delete(id).await? {
            return Err(AppError::NotFound("Department not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_departments(&self) -> AppResult<Vec<Department>> {
        self.repository.departments.list().await
    }
}
