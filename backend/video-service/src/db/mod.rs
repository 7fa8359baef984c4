//! Persistence layer
//!
//! Each repository is a trait with a PostgreSQL implementation; `memory`
//! implements all of them in-process for tests and local runs.

pub mod comment_repo;
pub mod like_repo;
pub mod memory;
pub mod playlist_repo;
pub mod subscription_repo;
pub mod token_revocation;
pub mod user_repo;
pub mod video_repo;
pub mod watch_history_repo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use like_repo::{LikeRepository, PgLikeRepository};
pub use memory::MemoryStore;
pub use playlist_repo::{PgPlaylistRepository, PlaylistRepository};
pub use subscription_repo::{PgSubscriptionRepository, SubscriptionRepository};
pub use token_revocation::PgRevocationLedger;
pub use user_repo::{PgUserRepository, UserRepository};
pub use video_repo::{PgVideoRepository, VideoRepository};
pub use watch_history_repo::{PgWatchHistoryRepository, WatchHistoryRepository};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule was violated; the message is safe to show clients.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Postgres `unique_violation`
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Map unique violations to `Conflict(message)`, everything else to `Database`.
pub(crate) fn conflict_or(err: sqlx::Error, message: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(message.to_string())
    } else {
        StoreError::Database(err)
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "PostgreSQL connection pool created"
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
