use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{conflict_or, StoreError};
use crate::models::{SubscribedChannel, Subscription};

pub const ALREADY_SUBSCRIBED: &str = "Already subscribed to this channel";

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Fails with `Conflict` on a repeated subscription.
    async fn subscribe(&self, subscription: &Subscription) -> Result<(), StoreError>;
    async fn unsubscribe(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool, StoreError>;
    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64, StoreError>;
    /// Newest subscription first.
    async fn subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscribedChannel>, StoreError>;
}

pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn subscribe(&self, subscription: &Subscription) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.subscriber_id)
        .bind(subscription.channel_id)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, ALREADY_SUBSCRIBED))?;

        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
                .bind(subscriber_id)
                .bind(channel_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM subscriptions WHERE channel_id = $1")
            .bind(channel_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscribedChannel>, StoreError> {
        let channels = sqlx::query_as::<_, SubscribedChannel>(
            r#"
            SELECT c.id AS channel_id,
                   c.name AS channel_name,
                   c.created_at AS channel_created_at,
                   s.created_at AS subscribed_at,
                   (SELECT COUNT(*) FROM subscriptions s2 WHERE s2.channel_id = c.id)
                       AS subscriber_count
            FROM subscriptions s
            JOIN channels c ON c.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }
}
