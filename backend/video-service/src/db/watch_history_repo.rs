use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::WatchEntry;

#[async_trait]
pub trait WatchHistoryRepository: Send + Sync {
    async fn record_watch(&self, entry: &WatchEntry) -> Result<(), StoreError>;
    /// Most recent first.
    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WatchEntry>, StoreError>;
    /// Removes every entry of `video_id` for the user; returns how many.
    async fn remove_from_history(&self, user_id: Uuid, video_id: Uuid) -> Result<u64, StoreError>;
}

pub struct PgWatchHistoryRepository {
    pool: PgPool,
}

impl PgWatchHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchHistoryRepository for PgWatchHistoryRepository {
    async fn record_watch(&self, entry: &WatchEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO watch_history (id, user_id, video_id, watched_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.video_id)
        .bind(entry.watched_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WatchEntry>, StoreError> {
        let entries = sqlx::query_as::<_, WatchEntry>(
            r#"
            SELECT id, user_id, video_id, watched_at
            FROM watch_history
            WHERE user_id = $1
            ORDER BY watched_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn remove_from_history(&self, user_id: Uuid, video_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM watch_history WHERE user_id = $1 AND video_id = $2")
            .bind(user_id)
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
