use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::Playlist;

#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    async fn create_playlist(&self, playlist: &Playlist) -> Result<(), StoreError>;
    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError>;
    /// Appends unless present. Returns whether the playlist changed.
    async fn add_playlist_video(
        &self,
        id: Uuid,
        video_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
    /// Returns whether the playlist changed.
    async fn remove_playlist_video(
        &self,
        id: Uuid,
        video_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
    async fn delete_playlist(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgPlaylistRepository {
    pool: PgPool,
}

impl PgPlaylistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for PgPlaylistRepository {
    async fn create_playlist(&self, playlist: &Playlist) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO playlists (id, owner_id, name, is_public, video_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(playlist.id)
        .bind(playlist.owner_id)
        .bind(&playlist.name)
        .bind(playlist.is_public)
        .bind(&playlist.video_ids)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, owner_id, name, is_public, video_ids, created_at, updated_at
            FROM playlists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn add_playlist_video(
        &self,
        id: Uuid,
        video_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // The NOT ANY guard keeps the array duplicate-free under concurrent adds.
        let result = sqlx::query(
            r#"
            UPDATE playlists
            SET video_ids = array_append(video_ids, $2), updated_at = $3
            WHERE id = $1 AND NOT ($2 = ANY(video_ids))
            "#,
        )
        .bind(id)
        .bind(video_id)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_playlist_video(
        &self,
        id: Uuid,
        video_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE playlists
            SET video_ids = array_remove(video_ids, $2), updated_at = $3
            WHERE id = $1 AND $2 = ANY(video_ids)
            "#,
        )
        .bind(id)
        .bind(video_id)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
