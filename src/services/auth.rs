//! Authentication service: registration, login, JWT issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        LoginRequest, RegisterUser, UpdateUser, User, UserClaims, UserProfile, ROLE_ADMIN,
        ROLE_STUDENT, ROLE_TEACHER,
    },
    repository::{Repository, UserStore},
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user with a hashed password
    pub async fn register(&self, request: RegisterUser) -> AppResult<UserProfile> {
        if self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(request.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?
            .to_string();

        let user = self
            .repository
            .users
            .create(
                &request.first_name,
                &request.last_name,
                &request.id_number,
                &request.email,
                &password_hash,
                &request.role,
                request.department_id,
            )
            .await?;

        Ok(user.into())
    }

    /// Verify credentials and issue a JWT
    pub async fn login(&self, request: LoginRequest) -> AppResult<(String, UserProfile)> {
        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("stored hash is invalid: {}", e)))?;

        Argon2::default()
            .verify_password(request.password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::Authentication("Invalid email or password".to_string()))?;

        let token = self.issue_token(&user)?;
        Ok((token, user.into()))
    }

    /// Fetch the profile behind a set of claims
    pub async fn profile(&self, user_id: uuid::Uuid) -> AppResult<UserProfile> {
        let user = self
            .repository
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// All user profiles, for the admin view
    pub async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.repository.users.list().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Apply an admin update to a user's details
    pub async fn update_user(
        &self,
        user_id: uuid::Uuid,
        update: UpdateUser,
    ) -> AppResult<UserProfile> {
        if let Some(role) = update.role.as_deref() {
            if !matches!(role, ROLE_ADMIN | ROLE_TEACHER | ROLE_STUDENT) {
                return Err(AppError::Validation(format!("unknown role '{}'", role)));
            }
        }

        let user = self
            .repository
            .users
            .update(user_id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Store the reference embedding used for face verification
    pub async fn register_face(
        &self,
        user_id: uuid::Uuid,
        embedding: &[f32],
    ) -> AppResult<()> {
        if embedding.is_empty() {
            return Err(AppError::NoFaceDetected);
        }
        let updated = self
            .repository
            .users
            .set_face_embedding(user_id, embedding)
            .await?;

        if !updated {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        let claims = UserClaims {
            sub: user.id,
            role: user.role.clone(),
            exp: (Utc::now() + Duration::hours(self.config.jwt_expiration_hours as i64))
                .timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))
    }
}

impl UserClaims {
    /// Decode and validate a bearer token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}
