pub mod comments;
pub mod engagement;
pub mod health;
pub mod playlists;
pub mod users;
pub mod videos;
pub mod watch_history;

use actix_middleware::AuthenticatedUser;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Video;
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// `?limit&offset`
#[derive(Debug, Default, Deserialize)]
pub struct OffsetQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OffsetQuery {
    /// Out-of-range values are clamped rather than rejected.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// `?page&limit`, page numbers start at 1
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Returns `(page, limit, offset)`.
    pub fn resolve(&self) -> Result<(i64, i64, i64)> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))?;

        Ok((page, limit, offset))
    }
}

/// The gate guarantees a verified subject; this only types it.
pub fn current_user_id(user: &AuthenticatedUser) -> Result<Uuid> {
    Uuid::parse_str(&user.subject).map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

pub(crate) async fn require_video(state: &AppState, video_id: Uuid) -> Result<Video> {
    state
        .videos
        .find_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_offset_query_clamps() {
        let query = OffsetQuery {
            limit: Some(1000),
            offset: Some(-5),
        };
        assert_eq!(query.resolve(), (MAX_PAGE_SIZE, 0));
        assert_eq!(OffsetQuery::default().resolve(), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn test_page_query_bounds() {
        assert_eq!(PageQuery::default().resolve().unwrap(), (1, 20, 0));

        let third = PageQuery {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(third.resolve().unwrap(), (3, 10, 20));

        for (page, limit) in [(0, 20), (1, 0), (1, 101), (i64::MAX, 100)] {
            let query = PageQuery {
                page: Some(page),
                limit: Some(limit),
            };
            assert!(matches!(query.resolve(), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_current_user_id_requires_uuid_subject() {
        let user = AuthenticatedUser {
            subject: "not-a-uuid".into(),
            token: "t".into(),
            expires_at: Utc::now(),
        };
        assert!(matches!(
            current_user_id(&user),
            Err(AppError::Unauthorized(_))
        ));
    }
}
