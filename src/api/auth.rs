//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterUser, UserProfile},
    AppState,
};

use super::AuthenticatedUser;

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: UserProfile,
}

/// Face registration payload: a base64-encoded embedding sample
#[derive(Deserialize, ToSchema)]
pub struct RegisterFaceRequest {
    pub sample: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.services.auth.login(request).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.auth.profile(claims.sub).await?;
    Ok(Json(profile))
}

/// Register the current user's face reference embedding
#[utoipa::path(
    post,
    path = "/auth/face",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = RegisterFaceRequest,
    responses(
        (status = 204, description = "Reference embedding stored"),
        (status = 400, description = "No usable face in the sample")
    )
)]
pub async fn register_face(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<RegisterFaceRequest>,
) -> AppResult<StatusCode> {
    let sample = decode_sample(&request.sample)?;
    let embedding = state.services.attendance.extract_embedding(&sample)?;
    state
        .services
        .auth
        .register_face(claims.sub, &embedding)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn decode_sample(sample: &str) -> Result<Vec<u8>, AppError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(sample)
        .map_err(|_| AppError::BadRequest("sample is not valid base64".to_string()))
}
