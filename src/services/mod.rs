// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod password;
pub mod session;
pub mod token;
pub mod users;

pub use session::SessionCache;
pub use token::TokenService;
pub use users::{LoginOutcome, UserService};
