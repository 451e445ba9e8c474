//! Refresh token storage in Redis.
//!
//! Tokens are opaque random strings. Each is single use: `rotate` consumes
//! the presented token and issues a new one for the same user.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use hearth_common::auth::generate_refresh_token;
use hearth_core::Snowflake;

use crate::pool::{CacheResult, RedisPool};

const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenData {
    pub user_id: Snowflake,
    /// Unix epoch seconds
    pub issued_at: i64,
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RefreshTokenStore {
    #[must_use]
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(token: &str) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{token}")
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Store a fresh token for `user_id` and return it.
    pub async fn issue(&self, user_id: Snowflake) -> CacheResult<String> {
        let token = generate_refresh_token();
        let data = RefreshTokenData {
            user_id,
            issued_at: Utc::now().timestamp(),
        };
        self.pool
            .set_ex(&Self::key(&token), &data, self.ttl_seconds)
            .await?;
        tracing::debug!(user_id = %user_id, "Issued refresh token");
        Ok(token)
    }

    /// Consume `token` and issue its replacement. `None` when the token is
    /// unknown, expired or already used.
    pub async fn rotate(&self, token: &str) -> CacheResult<Option<(Snowflake, String)>> {
        let Some(data) = self
            .pool
            .take::<RefreshTokenData>(&Self::key(token))
            .await?
        else {
            return Ok(None);
        };
        let next = self.issue(data.user_id).await?;
        Ok(Some((data.user_id, next)))
    }

    pub async fn revoke(&self, token: &str) -> CacheResult<bool> {
        let deleted = self.pool.delete(&Self::key(token)).await?;
        if deleted {
            tracing::debug!("Revoked refresh token");
        }
        Ok(deleted)
    }
}
