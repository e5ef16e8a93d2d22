// SPDX-License-Identifier: MIT

//! Token issuance and validation.
//!
//! Access and refresh tokens are HS256-signed JWTs carrying a single
//! user-id claim and an absolute expiry. The claim schema is fixed at
//! issuance (`user_id` as an unsigned integer), but the parser still
//! accepts a string-encoded id so tokens minted by older issuers keep
//! validating.

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access tokens expire 15 minutes after issuance.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh tokens expire 24 hours after issuance.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id the token was issued for
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: u64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Issues and validates signed bearer tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `user_id` expiring `ttl_secs` from now.
    pub fn issue(&self, user_id: u64, ttl_secs: i64) -> Result<String, AppError> {
        self.issue_at(user_id, ttl_secs, Utc::now())
    }

    /// Issue a token with an explicit issuance instant.
    ///
    /// Exposed so tests can simulate the clock; production paths go
    /// through [`issue`](Self::issue).
    pub fn issue_at(
        &self,
        user_id: u64,
        ttl_secs: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ttl_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Token signing failed: {}", e)))
    }

    /// Verify signature and expiry, returning the user id claim.
    ///
    /// A bad signature, malformed token, or elapsed expiry yields
    /// `InvalidToken`; a claim set that cannot be normalized to an
    /// unsigned integer yields `InvalidClaim`.
    pub fn parse(&self, token: &str) -> Result<u64, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::Json(_) => AppError::InvalidClaim,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(data.claims.user_id)
    }
}

/// Accept the user id as either a JSON number or a string-encoded integer.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct UserIdVisitor;

    impl serde::de::Visitor<'_> for UserIdVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an unsigned integer or string-encoded integer")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom("user id must be non-negative"))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<u64, E> {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as u64)
            } else {
                Err(E::custom("user id must be a non-negative integer"))
            }
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse()
                .map_err(|_| E::custom("user id string is not an unsigned integer"))
        }
    }

    deserializer.deserialize_any(UserIdVisitor)
}
