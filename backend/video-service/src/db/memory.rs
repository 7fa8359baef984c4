//! In-process implementation of every repository
//!
//! Mirrors the PostgreSQL constraints that matter to callers: unique
//! usernames/emails, one like per (user, video), one subscription per
//! (subscriber, channel), and cascading deletes from videos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::comment_repo::CommentRepository;
use super::like_repo::{LikeRepository, ALREADY_LIKED};
use super::playlist_repo::PlaylistRepository;
use super::subscription_repo::{SubscriptionRepository, ALREADY_SUBSCRIBED};
use super::user_repo::{UserRepository, CHANNEL_EXISTS, DUPLICATE_ACCOUNT};
use super::video_repo::VideoRepository;
use super::watch_history_repo::WatchHistoryRepository;
use super::StoreError;
use crate::models::{
    Channel, Comment, Like, Playlist, SubscribedChannel, Subscription, User, Video, WatchEntry,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    channels: HashMap<Uuid, Channel>,
    videos: HashMap<Uuid, Video>,
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
    comments: HashMap<Uuid, Comment>,
    playlists: HashMap<Uuid, Playlist>,
    watch_history: Vec<WatchEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let taken = state
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(StoreError::Conflict(DUPLICATE_ACCOUNT.to_string()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_channel(
        &self,
        owner_id: Uuid,
        channel: &Channel,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let Some(user) = state.users.get_mut(&owner_id) else {
            return Ok(None);
        };
        if user.channel_id.is_some() {
            return Err(StoreError::Conflict(CHANNEL_EXISTS.to_string()));
        }

        user.channel_id = Some(channel.id);
        user.updated_at = channel.created_at;
        let updated = user.clone();
        state.channels.insert(channel.id, channel.clone());
        Ok(Some(updated))
    }

    async fn find_channel(&self, id: Uuid) -> Result<Option<Channel>, StoreError> {
        Ok(self.state.read().await.channels.get(&id).cloned())
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn create_video(&self, video: &Video) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .videos
            .insert(video.id, video.clone());
        Ok(())
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        Ok(self.state.read().await.videos.get(&id).cloned())
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.videos.remove(&id).is_none() {
            return Ok(false);
        }
        state.likes.retain(|l| l.video_id != id);
        state.comments.retain(|_, c| c.video_id != id);
        state.watch_history.retain(|w| w.video_id != id);
        Ok(true)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<i64>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.videos.get_mut(&id).map(|video| {
            video.views += 1;
            video.views
        }))
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn add_like(&self, like: &Like) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state
            .likes
            .iter()
            .any(|l| l.user_id == like.user_id && l.video_id == like.video_id)
        {
            return Err(StoreError::Conflict(ALREADY_LIKED.to_string()));
        }
        state.likes.push(like.clone());
        Ok(())
    }

    async fn remove_like(&self, user_id: Uuid, video_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(l.user_id == user_id && l.video_id == video_id));
        Ok(state.likes.len() != before)
    }

    async fn count_likes(&self, video_id: Uuid) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        Ok(state.likes.iter().filter(|l| l.video_id == video_id).count() as i64)
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn subscribe(&self, subscription: &Subscription) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.subscriptions.iter().any(|s| {
            s.subscriber_id == subscription.subscriber_id
                && s.channel_id == subscription.channel_id
        }) {
            return Err(StoreError::Conflict(ALREADY_SUBSCRIBED.to_string()));
        }
        state.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|s| !(s.subscriber_id == subscriber_id && s.channel_id == channel_id));
        Ok(state.subscriptions.len() != before)
    }

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .count() as i64)
    }

    async fn subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<SubscribedChannel>, StoreError> {
        let state = self.state.read().await;
        let mut channels: Vec<SubscribedChannel> = state
            .subscriptions
            .iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .filter_map(|s| {
                let channel = state.channels.get(&s.channel_id)?;
                let subscriber_count = state
                    .subscriptions
                    .iter()
                    .filter(|other| other.channel_id == channel.id)
                    .count() as i64;
                Some(SubscribedChannel {
                    channel_id: channel.id,
                    channel_name: channel.name.clone(),
                    channel_created_at: channel.created_at,
                    subscribed_at: s.created_at,
                    subscriber_count,
                })
            })
            .collect();
        channels.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));
        Ok(channels)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn update_comment(
        &self,
        id: Uuid,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.comments.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = updated_at;
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.write().await.comments.remove(&id).is_some())
    }

    async fn list_comments(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(comments, limit, offset))
    }
}

#[async_trait]
impl PlaylistRepository for MemoryStore {
    async fn create_playlist(&self, playlist: &Playlist) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .playlists
            .insert(playlist.id, playlist.clone());
        Ok(())
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError> {
        Ok(self.state.read().await.playlists.get(&id).cloned())
    }

    async fn add_playlist_video(
        &self,
        id: Uuid,
        video_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(match state.playlists.get_mut(&id) {
            Some(playlist) => {
                if playlist.add_video(video_id) {
                    playlist.updated_at = updated_at;
                    true
                } else {
                    false
                }
            }
            None => false,
        })
    }

    async fn remove_playlist_video(
        &self,
        id: Uuid,
        video_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(match state.playlists.get_mut(&id) {
            Some(playlist) => {
                if playlist.remove_video(video_id) {
                    playlist.updated_at = updated_at;
                    true
                } else {
                    false
                }
            }
            None => false,
        })
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.write().await.playlists.remove(&id).is_some())
    }
}

#[async_trait]
impl WatchHistoryRepository for MemoryStore {
    async fn record_watch(&self, entry: &WatchEntry) -> Result<(), StoreError> {
        self.state.write().await.watch_history.push(entry.clone());
        Ok(())
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WatchEntry>, StoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<WatchEntry> = state
            .watch_history
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        Ok(page(entries, limit, offset))
    }

    async fn remove_from_history(&self, user_id: Uuid, video_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.watch_history.len();
        state
            .watch_history
            .retain(|w| !(w.user_id == user_id && w.video_id == video_id));
        Ok((before - state.watch_history.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            avatar_url: None,
            cover_image_url: None,
            channel_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn channel(name: &str) -> Channel {
        let now = Utc::now();
        Channel {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(&user("alice", "a@x.io")).await.unwrap();

        let dup_name = store.create_user(&user("alice", "other@x.io")).await;
        let dup_email = store.create_user(&user("bob", "a@x.io")).await;

        assert!(matches!(dup_name, Err(StoreError::Conflict(_))));
        assert!(matches!(dup_email, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_second_channel_is_rejected() {
        let store = MemoryStore::new();
        let alice = user("alice", "a@x.io");
        store.create_user(&alice).await.unwrap();

        let updated = store
            .create_channel(alice.id, &channel("alice tv"))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.channel_id.is_some());

        let again = store.create_channel(alice.id, &channel("alice 2")).await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));
        assert!(store
            .create_channel(Uuid::new_v4(), &channel("ghost"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_subscribed_channels_newest_first_with_counts() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (first, second) = (channel("first"), channel("second"));
        {
            let mut state = store.state.write().await;
            state.channels.insert(first.id, first.clone());
            state.channels.insert(second.id, second.clone());
        }
        let now = Utc::now();
        for (subscriber, channel_id, at) in [
            (viewer, first.id, now - Duration::minutes(5)),
            (viewer, second.id, now),
            (other, first.id, now),
        ] {
            store
                .subscribe(&Subscription {
                    id: Uuid::new_v4(),
                    subscriber_id: subscriber,
                    channel_id,
                    created_at: at,
                })
                .await
                .unwrap();
        }

        let channels = store.subscribed_channels(viewer).await.unwrap();

        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].channel_name, "second");
        assert_eq!(channels[1].channel_name, "first");
        assert_eq!(channels[1].subscriber_count, 2);
    }

    #[tokio::test]
    async fn test_deleting_video_cascades() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            title: "clip".into(),
            url: "https://cdn.example/clip.mp4".into(),
            owner_id: owner,
            channel_id: None,
            views: 0,
            duration: "00:01:00".into(),
            created_at: now,
            updated_at: now,
        };
        store.create_video(&video).await.unwrap();
        store
            .add_like(&Like {
                id: Uuid::new_v4(),
                user_id: owner,
                video_id: video.id,
                created_at: now,
            })
            .await
            .unwrap();

        assert!(store.delete_video(video.id).await.unwrap());
        assert_eq!(store.count_likes(video.id).await.unwrap(), 0);
        assert!(!store.delete_video(video.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_history_pagination() {
        let store = MemoryStore::new();
        let viewer = Uuid::new_v4();
        let now = Utc::now();
        for minutes in 0..5 {
            store
                .record_watch(&WatchEntry {
                    id: Uuid::new_v4(),
                    user_id: viewer,
                    video_id: Uuid::new_v4(),
                    watched_at: now - Duration::minutes(minutes),
                })
                .await
                .unwrap();
        }

        let first_page = store.list_history(viewer, 2, 0).await.unwrap();
        let last_page = store.list_history(viewer, 2, 4).await.unwrap();

        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].watched_at, now);
        assert_eq!(last_page.len(), 1);
    }
}
