use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{current_user_id, require_video, MessageResponse};
use crate::error::{AppError, Result};
use crate::models::{format_duration, Video};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(url)]
    pub url: String,

    pub duration_seconds: u32,
}

/// POST /api/v1/videos
///
/// The video is attached to the caller's channel when they have one.
pub async fn create_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateVideoRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    if body.title.trim().is_empty() {
        return Err(AppError::ValidationError("invalid fields: title".to_string()));
    }

    let owner_id = current_user_id(&user)?;
    let owner = state
        .users
        .find_user(owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = Utc::now();
    let video = Video {
        id: Uuid::new_v4(),
        title: body.title.trim().to_string(),
        url: body.url.clone(),
        owner_id,
        channel_id: owner.channel_id,
        views: 0,
        duration: format_duration(body.duration_seconds),
        created_at: now,
        updated_at: now,
    };
    state.videos.create_video(&video).await?;
    info!(video_id = %video.id, owner_id = %owner_id, "video created");

    Ok(HttpResponse::Created().json(video))
}

/// GET /api/v1/videos/{id}
pub async fn get_video(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = require_video(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(video))
}

/// DELETE /api/v1/videos/{id}
pub async fn delete_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = require_video(&state, path.into_inner()).await?;
    if video.owner_id != current_user_id(&user)? {
        return Err(AppError::Forbidden(
            "You can only delete your own videos".to_string(),
        ));
    }

    if !state.videos.delete_video(video.id).await? {
        return Err(AppError::NotFound("Video not found".to_string()));
    }
    info!(video_id = %video.id, "video deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Video deleted successfully")))
}

/// POST /api/v1/videos/{id}/views
pub async fn record_view(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    let views = state
        .videos
        .increment_views(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "video_id": video_id,
        "views": views,
    })))
}
