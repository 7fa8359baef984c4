use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jwt_security::{LedgerError, RevocationLedger};
use sqlx::PgPool;
use tracing::error;

/// Revocation ledger on the primary PostgreSQL database, so a logout is
/// visible to the very next request on any instance.
pub struct PgRevocationLedger {
    pool: PgPool,
}

impl PgRevocationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_error(context: &str, err: sqlx::Error) -> LedgerError {
    error!(error = %err, "{}", context);
    LedgerError::Storage(err.to_string())
}

#[async_trait]
impl RevocationLedger for PgRevocationLedger {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO token_revocations (token, created_at, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(Utc::now())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("failed to record token revocation", e))?;

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, LedgerError> {
        let (revoked,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM token_revocations WHERE token = $1)")
                .bind(token)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| storage_error("failed to check token revocation", e))?;

        Ok(revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let result = sqlx::query("DELETE FROM token_revocations WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("failed to purge expired revocations", e))?;

        Ok(result.rows_affected())
    }
}
