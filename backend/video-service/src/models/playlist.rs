use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ordered, duplicate-free list of videos owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub is_public: bool,
    pub video_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn has_video(&self, video_id: Uuid) -> bool {
        self.video_ids.contains(&video_id)
    }

    /// Appends unless already present. Returns whether the list changed.
    pub fn add_video(&mut self, video_id: Uuid) -> bool {
        if self.has_video(video_id) {
            return false;
        }
        self.video_ids.push(video_id);
        true
    }

    /// Returns whether the list changed.
    pub fn remove_video(&mut self, video_id: Uuid) -> bool {
        let before = self.video_ids.len();
        self.video_ids.retain(|id| *id != video_id);
        self.video_ids.len() != before
    }

    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.is_public || self.owner_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WatchEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub watched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(owner_id: Uuid, is_public: bool) -> Playlist {
        let now = Utc::now();
        Playlist {
            id: Uuid::new_v4(),
            owner_id,
            name: "favourites".into(),
            is_public,
            video_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_is_deduplicated_and_ordered() {
        let mut list = playlist(Uuid::new_v4(), true);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(list.add_video(a));
        assert!(list.add_video(b));
        assert!(!list.add_video(a));
        assert_eq!(list.video_ids, vec![a, b]);
    }

    #[test]
    fn test_remove_reports_absence() {
        let mut list = playlist(Uuid::new_v4(), true);
        let a = Uuid::new_v4();
        list.add_video(a);

        assert!(list.remove_video(a));
        assert!(!list.remove_video(a));
        assert!(!list.has_video(a));
    }

    #[test]
    fn test_private_playlist_visibility() {
        let owner = Uuid::new_v4();
        let list = playlist(owner, false);

        assert!(list.is_visible_to(owner));
        assert!(!list.is_visible_to(Uuid::new_v4()));
    }
}
