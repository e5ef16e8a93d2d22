// SPDX-License-Identifier: MIT

//! User store with typed operations over MySQL.
//!
//! Provides the credential-store operations:
//! - create / fetch users (uniqueness on phone number and email)
//! - profile and password rewrites
//! - atomic distance accrual
//!
//! An in-memory backend mirrors the same semantics for tests and offline
//! use, so the service layer never branches on the backend.

use crate::error::AppError;
use crate::models::{NewUser, User, UserUpdate};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const MAX_CONNECTIONS: u32 = 10;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    phone_number VARCHAR(32) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password VARCHAR(255) NOT NULL,
    distance_travelled DOUBLE NOT NULL DEFAULT 0,
    UNIQUE KEY uq_users_phone_number (phone_number),
    UNIQUE KEY uq_users_email (email)
)
"#;

/// Credential store handle.
#[derive(Clone)]
pub struct UserStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    MySql(MySqlPool),
    Memory(Arc<Mutex<MemoryTables>>),
}

#[derive(Default)]
struct MemoryTables {
    next_id: u64,
    users: BTreeMap<u64, User>,
}

impl UserStore {
    /// Connect to MySQL with a bounded connection pool.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MySQL: {}", e)))?;

        tracing::info!("Connected to MySQL");

        Ok(Self {
            backend: Backend::MySql(pool),
        })
    }

    /// Create an in-memory store with the same uniqueness semantics.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(MemoryTables {
                next_id: 1,
                users: BTreeMap::new(),
            }))),
        }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        match &self.backend {
            Backend::MySql(pool) => {
                sqlx::query(CREATE_USERS_TABLE)
                    .execute(pool)
                    .await
                    .map_err(|e| AppError::Database(format!("Schema migration failed: {}", e)))?;
                tracing::info!("Schema ready");
                Ok(())
            }
            Backend::Memory(_) => Ok(()),
        }
    }

    /// Insert a new user row. Fails with `Conflict` if the phone number
    /// or email is already taken.
    pub async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        match &self.backend {
            Backend::MySql(pool) => {
                let result = sqlx::query(
                    "INSERT INTO users (name, phone_number, email, password, distance_travelled) \
                     VALUES (?, ?, ?, ?, 0)",
                )
                .bind(&new.name)
                .bind(&new.phone_number)
                .bind(&new.email)
                .bind(&new.password_hash)
                .execute(pool)
                .await
                .map_err(map_write_error)?;

                Ok(User {
                    id: result.last_insert_id(),
                    name: new.name.clone(),
                    phone_number: new.phone_number.clone(),
                    email: new.email.clone(),
                    password_hash: new.password_hash.clone(),
                    distance_travelled: 0.0,
                })
            }
            Backend::Memory(tables) => {
                let mut tables = lock(tables)?;
                if tables.users.values().any(|u| {
                    u.phone_number == new.phone_number || u.email == new.email
                }) {
                    return Err(conflict());
                }

                let id = tables.next_id;
                tables.next_id += 1;
                let user = User {
                    id,
                    name: new.name.clone(),
                    phone_number: new.phone_number.clone(),
                    email: new.email.clone(),
                    password_hash: new.password_hash.clone(),
                    distance_travelled: 0.0,
                };
                tables.users.insert(id, user.clone());
                Ok(user)
            }
        }
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, id: u64) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::MySql(pool) => sqlx::query_as::<_, User>(
                "SELECT id, name, phone_number, email, password, distance_travelled \
                 FROM users WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(tables) => Ok(lock(tables)?.users.get(&id).cloned()),
        }
    }

    /// Fetch a user by phone number (the login identifier).
    pub async fn get_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::MySql(pool) => sqlx::query_as::<_, User>(
                "SELECT id, name, phone_number, email, password, distance_travelled \
                 FROM users WHERE phone_number = ?",
            )
            .bind(phone_number)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(tables) => Ok(lock(tables)?
                .users
                .values()
                .find(|u| u.phone_number == phone_number)
                .cloned()),
        }
    }

    /// Rewrite the profile fields of a user.
    ///
    /// Existence is checked first because MySQL reports zero affected
    /// rows for a no-op update, which is indistinguishable from a
    /// missing row.
    pub async fn update_profile(&self, id: u64, update: &UserUpdate) -> Result<(), AppError> {
        match &self.backend {
            Backend::MySql(pool) => {
                self.require_user(id).await?;

                sqlx::query("UPDATE users SET name = ?, phone_number = ?, email = ? WHERE id = ?")
                    .bind(&update.name)
                    .bind(&update.phone_number)
                    .bind(&update.email)
                    .bind(id)
                    .execute(pool)
                    .await
                    .map_err(map_write_error)?;
                Ok(())
            }
            Backend::Memory(tables) => {
                let mut tables = lock(tables)?;
                if tables.users.values().any(|u| {
                    u.id != id
                        && (u.phone_number == update.phone_number || u.email == update.email)
                }) {
                    return Err(conflict());
                }

                let user = tables
                    .users
                    .get_mut(&id)
                    .ok_or_else(|| user_not_found(id))?;
                user.name = update.name.clone();
                user.phone_number = update.phone_number.clone();
                user.email = update.email.clone();
                Ok(())
            }
        }
    }

    /// Overwrite the password hash of a user by id.
    pub async fn set_password_hash(&self, id: u64, password_hash: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::MySql(pool) => {
                self.require_user(id).await?;

                sqlx::query("UPDATE users SET password = ? WHERE id = ?")
                    .bind(password_hash)
                    .bind(id)
                    .execute(pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(tables) => {
                let mut tables = lock(tables)?;
                let user = tables
                    .users
                    .get_mut(&id)
                    .ok_or_else(|| user_not_found(id))?;
                user.password_hash = password_hash.to_string();
                Ok(())
            }
        }
    }

    /// Overwrite the password hash of the user matching an email.
    /// Fails with `NotFound` when no user has that email.
    pub async fn set_password_hash_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        match &self.backend {
            Backend::MySql(pool) => {
                let exists = sqlx::query_as::<_, User>(
                    "SELECT id, name, phone_number, email, password, distance_travelled \
                     FROM users WHERE email = ?",
                )
                .bind(email)
                .fetch_optional(pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

                let user =
                    exists.ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))?;

                sqlx::query("UPDATE users SET password = ? WHERE id = ?")
                    .bind(password_hash)
                    .bind(user.id)
                    .execute(pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(tables) => {
                let mut tables = lock(tables)?;
                let user = tables
                    .users
                    .values_mut()
                    .find(|u| u.email == email)
                    .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))?;
                user.password_hash = password_hash.to_string();
                Ok(())
            }
        }
    }

    /// Add a positive delta to the cumulative distance of a user.
    ///
    /// The accrual is a single store-level increment, so concurrent
    /// deltas for the same user cannot lose updates.
    pub async fn add_distance(&self, id: u64, delta: f64) -> Result<(), AppError> {
        match &self.backend {
            Backend::MySql(pool) => {
                self.require_user(id).await?;

                sqlx::query(
                    "UPDATE users SET distance_travelled = distance_travelled + ? WHERE id = ?",
                )
                .bind(delta)
                .bind(id)
                .execute(pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(tables) => {
                let mut tables = lock(tables)?;
                let user = tables
                    .users
                    .get_mut(&id)
                    .ok_or_else(|| user_not_found(id))?;
                user.distance_travelled += delta;
                Ok(())
            }
        }
    }

    /// Fail with `NotFound` unless the user exists.
    async fn require_user(&self, id: u64) -> Result<(), AppError> {
        match self.get_user(id).await? {
            Some(_) => Ok(()),
            None => Err(user_not_found(id)),
        }
    }
}

fn user_not_found(id: u64) -> AppError {
    AppError::NotFound(format!("User {} not found", id))
}

fn conflict() -> AppError {
    AppError::Conflict("phone number or email already registered".to_string())
}

/// Map a MySQL write error, surfacing uniqueness violations as `Conflict`.
fn map_write_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return conflict();
        }
    }
    AppError::Database(err.to_string())
}

fn lock(tables: &Arc<Mutex<MemoryTables>>) -> Result<std::sync::MutexGuard<'_, MemoryTables>, AppError> {
    tables
        .lock()
        .map_err(|_| AppError::Database("memory store lock poisoned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(phone: &str, email: &str) -> NewUser {
        NewUser {
            name: "Test Rider".to_string(),
            phone_number: phone.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$fakehash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_ids_increment() {
        let store = UserStore::in_memory();
        let a = store.create_user(&new_user("111", "a@x.com")).await.unwrap();
        let b = store.create_user(&new_user("222", "b@x.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_memory_enforces_uniqueness() {
        let store = UserStore::in_memory();
        store.create_user(&new_user("111", "a@x.com")).await.unwrap();

        let dup_phone = store.create_user(&new_user("111", "b@x.com")).await;
        assert!(matches!(dup_phone, Err(AppError::Conflict(_))));

        let dup_email = store.create_user(&new_user("222", "a@x.com")).await;
        assert!(matches!(dup_email, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_memory_update_profile_conflict() {
        let store = UserStore::in_memory();
        store.create_user(&new_user("111", "a@x.com")).await.unwrap();
        let b = store.create_user(&new_user("222", "b@x.com")).await.unwrap();

        let update = UserUpdate {
            name: "B".to_string(),
            phone_number: "111".to_string(),
            email: "b@x.com".to_string(),
        };
        assert!(matches!(
            store.update_profile(b.id, &update).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_add_distance_accumulates() {
        let store = UserStore::in_memory();
        let user = store.create_user(&new_user("111", "a@x.com")).await.unwrap();

        store.add_distance(user.id, 10.0).await.unwrap();
        store.add_distance(user.id, 3.2).await.unwrap();

        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert!((stored.distance_travelled - 13.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_memory_missing_user_is_not_found() {
        let store = UserStore::in_memory();
        assert!(matches!(
            store.add_distance(99, 1.0).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.get_user(99).await.unwrap().is_none());
    }
}
