//! Likes and channel subscriptions

use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use super::{current_user_id, require_video, MessageResponse};
use crate::error::{AppError, Result};
use crate::models::{Like, Subscription};
use crate::state::AppState;

/// POST /api/v1/videos/{id}/like
pub async fn like_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = require_video(&state, path.into_inner()).await?;
    let like = Like {
        id: Uuid::new_v4(),
        user_id: current_user_id(&user)?,
        video_id: video.id,
        created_at: Utc::now(),
    };
    state.likes.add_like(&like).await?;

    Ok(HttpResponse::Created().json(like))
}

/// DELETE /api/v1/videos/{id}/like
pub async fn unlike_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    if !state
        .likes
        .remove_like(current_user_id(&user)?, video_id)
        .await?
    {
        return Err(AppError::NotFound(
            "You have not liked this video".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Like removed")))
}

/// GET /api/v1/videos/{id}/likes
pub async fn like_count(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let video = require_video(&state, path.into_inner()).await?;
    let count = state.likes.count_likes(video.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "video_id": video.id,
        "like_count": count,
    })))
}

async fn video_channel(state: &AppState, video_id: Uuid) -> Result<Uuid> {
    require_video(state, video_id)
        .await?
        .channel_id
        .ok_or_else(|| AppError::BadRequest("Video has no channel".to_string()))
}

/// POST /api/v1/videos/{id}/subscription
///
/// Subscribes the caller to the channel the video was published on.
pub async fn subscribe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let channel_id = video_channel(&state, path.into_inner()).await?;
    let subscription = Subscription {
        id: Uuid::new_v4(),
        subscriber_id: current_user_id(&user)?,
        channel_id,
        created_at: Utc::now(),
    };
    state.subscriptions.subscribe(&subscription).await?;

    Ok(HttpResponse::Created().json(subscription))
}

/// DELETE /api/v1/videos/{id}/subscription
pub async fn unsubscribe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let channel_id = video_channel(&state, path.into_inner()).await?;
    if !state
        .subscriptions
        .unsubscribe(current_user_id(&user)?, channel_id)
        .await?
    {
        return Err(AppError::NotFound(
            "Not subscribed to this channel".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Unsubscribed successfully")))
}

/// GET /api/v1/channels/{id}/subscribers/count
pub async fn subscriber_count(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let channel = state
        .users
        .find_channel(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;
    let count = state.subscriptions.count_subscribers(channel.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "channel_id": channel.id,
        "subscriber_count": count,
    })))
}
