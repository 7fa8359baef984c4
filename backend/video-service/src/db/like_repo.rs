use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{conflict_or, StoreError};
use crate::models::Like;

pub const ALREADY_LIKED: &str = "You already liked this video";

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Fails with `Conflict` when the user already liked the video.
    async fn add_like(&self, like: &Like) -> Result<(), StoreError>;
    async fn remove_like(&self, user_id: Uuid, video_id: Uuid) -> Result<bool, StoreError>;
    async fn count_likes(&self, video_id: Uuid) -> Result<i64, StoreError>;
}

pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn add_like(&self, like: &Like) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO video_likes (id, user_id, video_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(like.id)
        .bind(like.user_id)
        .bind(like.video_id)
        .bind(like.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, ALREADY_LIKED))?;

        Ok(())
    }

    async fn remove_like(&self, user_id: Uuid, video_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM video_likes WHERE user_id = $1 AND video_id = $2")
            .bind(user_id)
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_likes(&self, video_id: Uuid) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM video_likes WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }
}
