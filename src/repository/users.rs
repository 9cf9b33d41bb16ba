//! Users repository for database operations

use async_trait::async_trait;
use chrono::Local;
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::user::{UpdateUser, User},
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Create a user with an already-hashed password
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        id_number: &str,
        email: &str,
        password_hash: &str,
        role: &str,
        department_id: Option<Uuid>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, first_name, last_name, id_number, email, password_hash, role,
                 department_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(first_name)
        .bind(last_name)
        .bind(id_number)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(department_id)
        .bind(Local::now().naive_local())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Apply a partial update; unset fields keep their stored value
    pub async fn update(&self, user_id: Uuid, update: &UpdateUser) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                id_number = COALESCE($4, id_number),
                role = COALESCE($5, role),
                department_id = COALESCE($6, department_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.id_number)
        .bind(&update.role)
        .bind(update.department_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Store a reference embedding for face verification
    pub async fn set_face_embedding(
        &self,
        user_id: Uuid,
        embedding: &[f32],
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET face_embedding = $2 WHERE id = $1")
            .bind(user_id)
            .bind(Json(embedding.to_vec()))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
