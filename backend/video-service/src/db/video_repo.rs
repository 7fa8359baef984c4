use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::Video;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: &Video) -> Result<(), StoreError>;
    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, StoreError>;
    /// Returns whether a row was removed. Likes, comments and history go with it.
    async fn delete_video(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Atomic increment; `None` when the video does not exist.
    async fn increment_views(&self, id: Uuid) -> Result<Option<i64>, StoreError>;
}

pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO videos (id, title, url, owner_id, channel_id, views, duration,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(video.owner_id)
        .bind(video.channel_id)
        .bind(video.views)
        .bind(&video.duration)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, title, url, owner_id, channel_id, views, duration, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<i64>, StoreError> {
        let views: Option<(i64,)> =
            sqlx::query_as("UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING views")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(views.map(|(v,)| v))
    }
}
