//! Registration and login routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiError};
use probill_core::auth::{hash_password, verify_password};
use probill_db::UserRepository;

/// Request body for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// E-mail address, used as the login identifier and audit actor.
    #[validate(email)]
    pub email: String,
    /// Plaintext password, hashed with Argon2id before storage.
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, message = "full name is required"))]
    pub full_name: String,
}

/// Request body for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// E-mail address.
    #[validate(email)]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token type, always "Bearer".
    pub token_type: &'static str,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// POST `/auth/register` - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let password_hash = hash_password(&payload.password)
        .map_err(|e| ApiError::validation(format!("unusable password: {e}")))?;

    let repo = UserRepository::new((*state.db).clone());
    let user = repo
        .create(payload.email, password_hash, payload.full_name)
        .await?;

    info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "email": user.email,
            "full_name": user.full_name,
        })),
    ))
}

/// POST `/auth/login` - Exchange credentials for an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(ApiError::validation)?;

    let repo = UserRepository::new((*state.db).clone());
    let user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid e-mail or password"))?;

    let valid = verify_password(&payload.password, &user.password_hash)
        .map_err(|_| ApiError::unauthorized("invalid e-mail or password"))?;
    if !valid {
        return Err(ApiError::unauthorized("invalid e-mail or password"));
    }

    let access_token = state.jwt_service.generate_token(user.id, &user.email)?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.token_expires_in(),
    }))
}

/// Creates the auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}
