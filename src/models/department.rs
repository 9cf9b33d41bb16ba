//! Department (society) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Department model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
}

/// Create department request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartment {
    pub name: String,
}
