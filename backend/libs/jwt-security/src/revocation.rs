//! Revocation ledger
//!
//! A persisted set of exact token strings invalidated before natural expiry.
//! Writers are login (never) and logout; the request gate is the reader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("revocation storage error: {0}")]
    Storage(String),
}

/// One revoked token. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub token: String,
    pub created_at: DateTime<Utc>,
    /// The revoked token's own `exp`; past this the record can be purged.
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait RevocationLedger: Send + Sync {
    /// Record `token` as revoked. Revoking an already revoked token succeeds
    /// and leaves the first record untouched.
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), LedgerError>;

    /// Exact-match lookup.
    async fn is_revoked(&self, token: &str) -> Result<bool, LedgerError>;

    /// Delete records whose token has expired by `now`. Returns the count removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, LedgerError>;
}

/// Process-local ledger for tests and single-node development runs.
#[derive(Debug, Default)]
pub struct InMemoryRevocationLedger {
    records: RwLock<HashMap<String, RevocationRecord>>,
}

impl InMemoryRevocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn record(&self, token: &str) -> Option<RevocationRecord> {
        self.records.read().await.get(token).cloned()
    }
}

#[async_trait]
impl RevocationLedger for InMemoryRevocationLedger {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), LedgerError> {
        let mut records = self.records.write().await;
        records
            .entry(token.to_string())
            .or_insert_with(|| RevocationRecord {
                token: token.to_string(),
                created_at: Utc::now(),
                expires_at,
            });
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, LedgerError> {
        Ok(self.records.read().await.contains_key(token))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.expires_at >= now);
        Ok((before - records.len()) as u64)
    }
}
