use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_user_id, require_video, MessageResponse, PageQuery};
use crate::error::{AppError, Result};
use crate::models::WatchEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordWatchRequest {
    pub video_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WatchHistoryResponse {
    pub history: Vec<WatchEntry>,
    pub page: i64,
    pub limit: i64,
}

/// POST /api/v1/watch-history
pub async fn record_watch(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<RecordWatchRequest>,
) -> Result<HttpResponse> {
    let video = require_video(&state, body.video_id).await?;
    let entry = WatchEntry {
        id: Uuid::new_v4(),
        user_id: current_user_id(&user)?,
        video_id: video.id,
        watched_at: Utc::now(),
    };
    state.watch_history.record_watch(&entry).await?;

    Ok(HttpResponse::Created().json(entry))
}

/// GET /api/v1/watch-history?page&limit
pub async fn list_history(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (page, limit, offset) = query.resolve()?;
    let history = state
        .watch_history
        .list_history(current_user_id(&user)?, limit, offset)
        .await?;

    Ok(HttpResponse::Ok().json(WatchHistoryResponse {
        history,
        page,
        limit,
    }))
}

/// DELETE /api/v1/watch-history/{video_id}
pub async fn remove_from_history(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let removed = state
        .watch_history
        .remove_from_history(current_user_id(&user)?, path.into_inner())
        .await?;

    if removed == 0 {
        return Err(AppError::NotFound(
            "Video not found in watch history".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Removed from watch history")))
}
