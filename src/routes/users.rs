// SPDX-License-Identifier: MIT

//! Per-user routes (require a valid access token).
//! The auth middleware is applied in routes/mod.rs for these routes.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserUpdate;
use crate::routes::MessageResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{id}", get(get_user).put(update_user))
        .route("/api/users/{id}/password", put(change_password))
        .route("/api/users/{id}/distance", post(update_distance))
        .route("/api/logout", post(log_out))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: u64,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub distance_travelled: f64,
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<UserResponse>> {
    tracing::debug!(caller = caller.user_id, user_id = id, "Fetching profile");

    let user = state.users.get_user(id).await?;

    Ok(Json(UserResponse {
        user_id: user.id,
        name: user.name,
        phone_number: user.phone_number,
        email: user.email,
        distance_travelled: user.distance_travelled,
    }))
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub name: String,
    pub phone_number: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    tracing::debug!(caller = caller.user_id, user_id = id, "Updating profile");

    let update = UserUpdate {
        name: req.name,
        phone_number: req.phone_number,
        email: req.email,
    };
    state.users.update_user(id, &update).await?;

    Ok(Json(MessageResponse {
        message: "user updated".to_string(),
    }))
}

// ─── Password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    tracing::debug!(caller = caller.user_id, user_id = id, "Changing password");

    state
        .users
        .change_password(id, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "password changed".to_string(),
    }))
}

// ─── Distance accounting ─────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateDistanceRequest {
    pub distance_delta: f64,
}

async fn update_distance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateDistanceRequest>,
) -> Result<Json<MessageResponse>> {
    tracing::debug!(
        caller = caller.user_id,
        user_id = id,
        delta = req.distance_delta,
        "Accruing distance"
    );

    state
        .users
        .update_distance_travelled(id, req.distance_delta)
        .await?;

    Ok(Json(MessageResponse {
        message: "distance updated".to_string(),
    }))
}

// ─── Logout ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LogOutRequest {
    pub user_id: u64,
}

async fn log_out(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<LogOutRequest>,
) -> Result<Json<MessageResponse>> {
    tracing::debug!(caller = caller.user_id, user_id = req.user_id, "Logging out");

    state.users.log_out(req.user_id).await;

    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}
