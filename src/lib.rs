// SPDX-License-Identifier: MIT

//! Fleetpass: user accounts and sessions for a ride-hailing fleet.
//!
//! This crate provides the backend API for registration, login,
//! password management, distance accounting, and token-based
//! authentication for peer services.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{TokenService, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub users: UserService,
}
