//! Registration, login and the bearer-token extractor.

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::{json_body, AppState};
use crate::domain::credentials::{
    generate_token, hash_password, hash_token, validate_password, verify_password,
};
use crate::domain::{Email, User, ValidationError};
use crate::error::AppError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.as_i64(),
            email: u.email.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at_ms: i64,
}

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token_hash: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;
        let token_hash = hash_token(&state.config.token_secret, token);

        let user = state
            .repo
            .find_session_user(&token_hash, now_ms())
            .await
            .map_err(|e| AppError::from_repo(e, "Failed to verify session"))?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;

        Ok(AuthUser { user, token_hash })
    }
}

fn parse_email(email: Option<String>) -> Result<Email, ValidationError> {
    let email = email.ok_or(ValidationError::MissingField("email"))?;
    Email::from_str(&email)
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let req = json_body(payload)?;
    let email = parse_email(req.email)?;
    let password = validate_password(req.password)?;

    let password_hash = hash_password(&state.config.token_secret, &password);
    let user = state
        .repo
        .create_user(&email, &password_hash, now_ms())
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to register user"))?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = json_body(payload)?;
    let email = parse_email(req.email)?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or(ValidationError::MissingField("password"))?;

    let credentials = state
        .repo
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to log in"))?;

    let Some(credentials) = credentials else {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };
    if !verify_password(&state.config.token_secret, &password, &credentials.password_hash) {
        tracing::warn!(user_id = %credentials.user.id, "Login rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let now = now_ms();
    if let Err(e) = state.repo.purge_expired_sessions(now).await {
        tracing::warn!(error = %e, "Failed to purge expired sessions");
    }

    let token = generate_token();
    let ttl_ms = i64::try_from(state.config.token_ttl.as_millis()).unwrap_or(i64::MAX);
    let expires_at_ms = now.saturating_add(ttl_ms);
    state
        .repo
        .create_session(
            credentials.user.id,
            &hash_token(&state.config.token_secret, &token),
            expires_at_ms,
        )
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to log in"))?;

    tracing::info!(user_id = %credentials.user.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        expires_at_ms,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .delete_session(&auth.token_hash)
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to log out"))?;

    tracing::info!(user_id = %auth.user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}
