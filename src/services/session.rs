// SPDX-License-Identifier: MIT

//! Refresh-token session cache.
//!
//! Holds the two reciprocal mappings for each live session:
//! user id → refresh token and refresh token → user id, each expiring
//! 24 hours after creation. The pair is created and deleted together;
//! reads treat an elapsed TTL as absence.
//!
//! The cache is in-process (sharded maps with per-entry expiry). It sits
//! behind this narrow API so an external key-value store can replace it
//! without touching the service layer.

use crate::services::token::REFRESH_TOKEN_TTL_SECS;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

struct Entry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    /// user id → current refresh token
    refresh_tokens: DashMap<u64, Entry<String>>,
    /// refresh token → user id
    user_ids: DashMap<String, Entry<u64>>,
}

/// Session cache handle, cheap to clone.
#[derive(Clone, Default)]
pub struct SessionCache {
    inner: Arc<Inner>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store both mappings for a fresh session, expiring in 24 hours.
    pub fn store(&self, user_id: u64, refresh_token: &str) {
        self.store_with_ttl(
            user_id,
            refresh_token,
            Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        );
    }

    /// Store both mappings with an explicit TTL (tests use this to
    /// simulate elapsed sessions).
    ///
    /// The two writes are not transactional; the forward mapping lands
    /// first, matching the upstream contract.
    pub fn store_with_ttl(&self, user_id: u64, refresh_token: &str, ttl: Duration) {
        let expires_at = Utc::now() + ttl;

        self.inner.refresh_tokens.insert(
            user_id,
            Entry {
                value: refresh_token.to_string(),
                expires_at,
            },
        );
        self.inner.user_ids.insert(
            refresh_token.to_string(),
            Entry {
                value: user_id,
                expires_at,
            },
        );
    }

    /// Current refresh token for a user, or `None` if absent or expired.
    pub fn get(&self, user_id: u64) -> Option<String> {
        let now = Utc::now();
        if let Some(entry) = self.inner.refresh_tokens.get(&user_id) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }

        // Expired: drop the stale entry.
        self.inner.refresh_tokens.remove(&user_id);
        None
    }

    /// Resolve a refresh token back to its user id, or `None` if absent
    /// or expired.
    pub fn resolve(&self, refresh_token: &str) -> Option<u64> {
        let now = Utc::now();
        if let Some(entry) = self.inner.user_ids.get(refresh_token) {
            if entry.expires_at > now {
                return Some(entry.value);
            }
        } else {
            return None;
        }

        self.inner.user_ids.remove(refresh_token);
        None
    }

    /// Delete the session pair for a user.
    ///
    /// The reverse mapping is removed first when the current token is
    /// known; its absence is swallowed.
    pub fn revoke(&self, user_id: u64) {
        let token = self
            .inner
            .refresh_tokens
            .get(&user_id)
            .map(|entry| entry.value.clone());

        if let Some(token) = token {
            self.inner.user_ids.remove(&token);
        }
        self.inner.refresh_tokens.remove(&user_id);
    }
}
