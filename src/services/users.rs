// SPDX-License-Identifier: MIT

//! User operations: orchestrates the credential store, token service,
//! and session cache for each user-facing action.
//!
//! Every operation is a single request/response with no intermediate
//! state; the only shared state is the injected handles.

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::{NewUser, User, UserUpdate};
use crate::services::password;
use crate::services::session::SessionCache;
use crate::services::token::{TokenService, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};

/// Login failures report one message for both causes, so a caller cannot
/// probe which part was wrong.
const INVALID_CREDENTIALS: &str = "invalid phone number or password";

/// Tokens handed out by a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user_id: u64,
    pub access_token: String,
    pub refresh_token: String,
}

/// Business-logic layer for all user operations.
#[derive(Clone)]
pub struct UserService {
    store: UserStore,
    sessions: SessionCache,
    tokens: TokenService,
}

impl UserService {
    pub fn new(store: UserStore, sessions: SessionCache, tokens: TokenService) -> Self {
        Self {
            store,
            sessions,
            tokens,
        }
    }

    /// Register a new user. All four fields are required.
    pub async fn sign_up(
        &self,
        name: &str,
        phone_number: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if name.is_empty() || phone_number.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidArgument(
                "name, phone number, email and password are required".to_string(),
            ));
        }

        let new_user = NewUser {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            email: email.to_string(),
            password_hash: password::hash(password)?,
        };

        let user = self.store.create_user(&new_user).await?;
        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Authenticate by phone number and password, issuing an access token
    /// (15 min) and refresh token (24 h) and storing the session entry.
    pub async fn log_in(
        &self,
        phone_number: &str,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        if phone_number.is_empty() || password.is_empty() {
            return Err(AppError::InvalidArgument(
                "phone number and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_phone(phone_number)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;

        if !password::verify(password, &user.password_hash) {
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let access_token = self.tokens.issue(user.id, ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token = self.tokens.issue(user.id, REFRESH_TOKEN_TTL_SECS)?;
        self.sessions.store(user.id, &refresh_token);

        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginOutcome {
            user_id: user.id,
            access_token,
            refresh_token,
        })
    }

    /// Revoke the session entry for a user.
    pub async fn log_out(&self, user_id: u64) {
        self.sessions.revoke(user_id);
        tracing::info!(user_id, "User logged out");
    }

    /// Exchange a live refresh token for a fresh access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<String, AppError> {
        let user_id = self.sessions.resolve(refresh_token).ok_or_else(|| {
            AppError::Unauthenticated("invalid or expired refresh token".to_string())
        })?;

        self.tokens.issue(user_id, ACCESS_TOKEN_TTL_SECS)
    }

    /// Overwrite the password of the user matching an email.
    ///
    /// Authorizes solely by email possession; a known weakness of the
    /// upstream contract, preserved rather than silently fixed.
    pub async fn forgot_password(&self, email: &str, new_password: &str) -> Result<(), AppError> {
        if email.is_empty() || new_password.is_empty() {
            return Err(AppError::InvalidArgument(
                "email and new password are required".to_string(),
            ));
        }

        let hashed = password::hash(new_password)?;
        self.store.set_password_hash_by_email(email, &hashed).await?;
        tracing::info!(email, "Password reset via email");
        Ok(())
    }

    /// Overwrite a user's password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: u64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if new_password.is_empty() {
            return Err(AppError::InvalidArgument(
                "new password is required".to_string(),
            ));
        }

        let user = self.get_user(user_id).await?;
        if !password::verify(old_password, &user.password_hash) {
            return Err(AppError::Unauthenticated("invalid password".to_string()));
        }

        let hashed = password::hash(new_password)?;
        self.store.set_password_hash(user_id, &hashed).await?;
        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    /// Rewrite a user's profile fields.
    pub async fn update_user(&self, user_id: u64, update: &UserUpdate) -> Result<(), AppError> {
        if update.name.is_empty() || update.phone_number.is_empty() || update.email.is_empty() {
            return Err(AppError::InvalidArgument(
                "name, phone number and email are required".to_string(),
            ));
        }

        self.store.update_profile(user_id, update).await?;
        tracing::info!(user_id, "Profile updated");
        Ok(())
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, user_id: u64) -> Result<User, AppError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Accrue distance for a user. The delta must be strictly positive;
    /// the accrual is an atomic store-level increment.
    pub async fn update_distance_travelled(
        &self,
        user_id: u64,
        distance_delta: f64,
    ) -> Result<(), AppError> {
        if !(distance_delta > 0.0) {
            return Err(AppError::InvalidArgument(
                "distance delta must be strictly positive".to_string(),
            ));
        }

        self.store.add_distance(user_id, distance_delta).await?;
        tracing::debug!(user_id, distance_delta, "Distance accrued");
        Ok(())
    }

    /// Validate a bearer token and resolve the user it was issued for.
    /// Used by other services to authorize requests.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        if token.is_empty() {
            return Err(AppError::InvalidArgument("token is required".to_string()));
        }

        let user_id = self.tokens.parse(token)?;
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("invalid credentials".to_string()))
    }
}
