//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// A user row as stored in the `users` table.
///
/// `password_hash` is the bcrypt hash of the password (column `password`);
/// the plaintext never touches the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Primary key (auto-increment)
    pub id: u64,
    /// Display name
    pub name: String,
    /// Phone number (unique, used as the login identifier)
    pub phone_number: String,
    /// Email address (unique)
    pub email: String,
    /// Bcrypt password hash
    #[sqlx(rename = "password")]
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Cumulative distance travelled, in kilometers
    pub distance_travelled: f64,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile fields that may be rewritten after creation.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub name: String,
    pub phone_number: String,
    pub email: String,
}
