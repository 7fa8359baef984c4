//! Application state shared by every handler
//!
//! All persistence handles are trait objects so the same routes run against
//! PostgreSQL in production and the in-memory store in tests.

use actix_middleware::AuthGate;
use jwt_security::{InMemoryRevocationLedger, RevocationLedger, TokenCodec};
use sqlx::PgPool;
use std::sync::Arc;

use crate::db::{
    CommentRepository, LikeRepository, MemoryStore, PgCommentRepository, PgLikeRepository,
    PgPlaylistRepository, PgSubscriptionRepository, PgUserRepository, PgVideoRepository,
    PgWatchHistoryRepository, PlaylistRepository, SubscriptionRepository, UserRepository,
    VideoRepository, WatchHistoryRepository,
};
use crate::services::{AccountService, SessionService};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
    pub watch_history: Arc<dyn WatchHistoryRepository>,
    pub codec: Arc<TokenCodec>,
    pub ledger: Arc<dyn RevocationLedger>,
    pub sessions: Arc<SessionService>,
    pub accounts: Arc<AccountService>,
    /// Present only for the PostgreSQL backend; used by readiness checks.
    pub pool: Option<PgPool>,
}

impl AppState {
    /// Everything in process, including the revocation ledger.
    pub fn in_memory(codec: Arc<TokenCodec>) -> Self {
        Self::in_memory_with_ledger(codec, Arc::new(InMemoryRevocationLedger::new()))
    }

    pub fn in_memory_with_ledger(
        codec: Arc<TokenCodec>,
        ledger: Arc<dyn RevocationLedger>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            videos: store.clone(),
            likes: store.clone(),
            subscriptions: store.clone(),
            comments: store.clone(),
            playlists: store.clone(),
            watch_history: store.clone(),
            sessions: Arc::new(SessionService::new(store.clone(), codec.clone(), ledger.clone())),
            accounts: Arc::new(AccountService::new(store)),
            codec,
            ledger,
            pool: None,
        }
    }

    pub fn postgres(
        pool: PgPool,
        codec: Arc<TokenCodec>,
        ledger: Arc<dyn RevocationLedger>,
    ) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
        Self {
            videos: Arc::new(PgVideoRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool.clone())),
            subscriptions: Arc::new(PgSubscriptionRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            playlists: Arc::new(PgPlaylistRepository::new(pool.clone())),
            watch_history: Arc::new(PgWatchHistoryRepository::new(pool.clone())),
            sessions: Arc::new(SessionService::new(users.clone(), codec.clone(), ledger.clone())),
            accounts: Arc::new(AccountService::new(users.clone())),
            users,
            codec,
            ledger,
            pool: Some(pool),
        }
    }

    /// Gate sharing this state's codec and ledger.
    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(self.codec.clone(), self.ledger.clone())
    }
}
