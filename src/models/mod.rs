// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod user;

pub use user::{NewUser, User, UserUpdate};
