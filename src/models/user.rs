//! User model and authentication types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// One of "admin", "teacher", "student"
    pub role: String,
    pub department_id: Option<Uuid>,
    /// Reference embedding for face verification, when registered
    pub face_embedding: Option<sqlx::types::Json<Vec<f32>>>,
    pub created_at: NaiveDateTime,
}

/// Public user profile, safe to return to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub email: String,
    pub role: String,
    pub department_id: Option<Uuid>,
    pub has_face_registered: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            id_number: user.id_number,
            email: user.email,
            role: user.role,
            department_id: user.department_id,
            has_face_registered: user.face_embedding.is_some(),
        }
    }
}

/// Registration request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub department_id: Option<Uuid>,
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin update payload; unset fields keep their current value
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub id_number: Option<String>,
    pub role: Option<String>,
    pub department_id: Option<Uuid>,
}

/// JWT claims carried by every authenticated request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn is_teacher(&self) -> bool {
        self.role == ROLE_TEACHER || self.role == ROLE_ADMIN
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
