//! Redis-backed revocation ledger
//!
//! Records live until the revoked token would have expired anyway, so purging
//! is delegated to Redis key expiry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::revocation::{LedgerError, RevocationLedger};

pub const DEFAULT_KEY_PREFIX: &str = "vidshare:revoked:token:";

pub struct RedisRevocationLedger {
    redis: ConnectionManager,
    key_prefix: String,
}

impl RedisRevocationLedger {
    pub fn new(redis: ConnectionManager) -> Self {
        Self::with_prefix(redis, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(redis: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.into(),
        }
    }

    /// **Key format**: `{prefix}{sha256(token) as hex}`
    fn key_for(&self, token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("{}{}", self.key_prefix, hex::encode(digest))
    }
}

#[async_trait]
impl RevocationLedger for RedisRevocationLedger {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), LedgerError> {
        let key = self.key_for(token);
        let ttl_secs = (expires_at - Utc::now()).num_seconds().max(1);
        let mut conn = self.redis.clone();

        // NX keeps the first record when logout races itself.
        let created: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(Utc::now().timestamp())
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to record token revocation in Redis");
                LedgerError::Storage(e.to_string())
            })?;

        if created.is_some() {
            info!(ttl = ttl_secs, "token revoked");
        }
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, LedgerError> {
        let key = self.key_for(token);
        let mut conn = self.redis.clone();

        conn.exists(&key).await.map_err(|e| {
            error!(error = %e, "failed to check token revocation in Redis");
            LedgerError::Storage(e.to_string())
        })
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, LedgerError> {
        Ok(0)
    }
}
