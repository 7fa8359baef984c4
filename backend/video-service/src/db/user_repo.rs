use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{conflict_or, StoreError};
use crate::models::{Channel, User};

pub const DUPLICATE_ACCOUNT: &str = "Username or email already exists";
pub const CHANNEL_EXISTS: &str = "User already has a channel";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
    /// Creates the channel and attaches it to the user in one step.
    /// `Ok(None)` when the user does not exist.
    async fn create_channel(&self, owner_id: Uuid, channel: &Channel)
        -> Result<Option<User>, StoreError>;
    async fn find_channel(&self, id: Uuid) -> Result<Option<Channel>, StoreError>;
}

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar_url, cover_image_url, \
                            channel_id, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, avatar_url, cover_image_url,
                               channel_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(&user.cover_image_url)
        .bind(user.channel_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, DUPLICATE_ACCOUNT))?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_channel(
        &self,
        owner_id: Uuid,
        channel: &Channel,
    ) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT channel_id FROM users WHERE id = $1 FOR UPDATE")
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;

        match current {
            None => return Ok(None),
            Some((Some(_),)) => return Err(StoreError::Conflict(CHANNEL_EXISTS.to_string())),
            Some((None,)) => {}
        }

        sqlx::query(
            "INSERT INTO channels (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(channel.id)
        .bind(&channel.name)
        .bind(channel.created_at)
        .bind(channel.updated_at)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE users SET channel_id = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(owner_id)
            .bind(channel.id)
            .bind(channel.created_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user))
    }

    async fn find_channel(&self, id: Uuid) -> Result<Option<Channel>, StoreError> {
        let channel = sqlx::query_as::<_, Channel>(
            "SELECT id, name, created_at, updated_at FROM channels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(channel)
    }
}
