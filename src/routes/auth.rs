// SPDX-License-Identifier: MIT

//! Public authentication routes: registration, login, token refresh,
//! password reset, and token introspection for peer services.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::routes::MessageResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(log_in))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/authenticate", post(authenticate))
}

// ─── Sign up ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignUpRequest {
    pub name: String,
    pub phone_number: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    state
        .users
        .sign_up(&req.name, &req.phone_number, &req.email, &req.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "user registered".to_string(),
    }))
}

// ─── Log in ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LogInRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LogInResponse {
    pub user_id: u64,
    pub access_token: String,
    pub refresh_token: String,
}

async fn log_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogInRequest>,
) -> Result<Json<LogInResponse>> {
    let outcome = state.users.log_in(&req.phone_number, &req.password).await?;

    Ok(Json(LogInResponse {
        user_id: outcome.user_id,
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

// ─── Refresh ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>> {
    let access_token = state.users.refresh_token(&req.refresh_token).await?;
    Ok(Json(RefreshTokenResponse { access_token }))
}

// ─── Forgot password ─────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub new_password: String,
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    state
        .users
        .forgot_password(&req.email, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "password reset".to_string(),
    }))
}

// ─── Token introspection ─────────────────────────────────────

#[derive(Deserialize)]
pub struct AuthenticateRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct AuthenticateResponse {
    pub is_valid: bool,
    pub message: String,
    pub user_id: u64,
}

/// Validate a bearer token on behalf of a peer service.
async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthenticateRequest>,
) -> Result<Json<AuthenticateResponse>> {
    let user = state.users.authenticate(&req.token).await?;

    Ok(Json(AuthenticateResponse {
        is_valid: true,
        message: "authenticated".to_string(),
        user_id: user.id,
    }))
}
