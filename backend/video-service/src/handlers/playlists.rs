use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{current_user_id, require_video, MessageResponse};
use crate::error::{AppError, Result};
use crate::models::Playlist;
use crate::state::AppState;

fn default_public() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default = "default_public")]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddVideoRequest {
    pub video_id: Uuid,
}

fn playlist_not_found() -> AppError {
    AppError::NotFound("Playlist not found".to_string())
}

/// Loads a playlist the caller can see. Private playlists of other users
/// are reported as missing.
async fn visible_playlist(state: &AppState, playlist_id: Uuid, user_id: Uuid) -> Result<Playlist> {
    state
        .playlists
        .find_playlist(playlist_id)
        .await?
        .filter(|playlist| playlist.is_visible_to(user_id))
        .ok_or_else(playlist_not_found)
}

async fn owned_playlist(state: &AppState, playlist_id: Uuid, user_id: Uuid) -> Result<Playlist> {
    let playlist = visible_playlist(state, playlist_id, user_id).await?;
    if playlist.owner_id != user_id {
        return Err(AppError::Forbidden(
            "You can only modify your own playlists".to_string(),
        ));
    }
    Ok(playlist)
}

/// POST /api/v1/playlists
pub async fn create_playlist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("invalid fields: name".to_string()));
    }

    let now = Utc::now();
    let playlist = Playlist {
        id: Uuid::new_v4(),
        owner_id: current_user_id(&user)?,
        name: name.to_string(),
        is_public: body.is_public,
        video_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    state.playlists.create_playlist(&playlist).await?;
    info!(playlist_id = %playlist.id, "playlist created");

    Ok(HttpResponse::Created().json(playlist))
}

/// GET /api/v1/playlists/{id}
pub async fn get_playlist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlist = visible_playlist(&state, path.into_inner(), current_user_id(&user)?).await?;
    Ok(HttpResponse::Ok().json(playlist))
}

/// POST /api/v1/playlists/{id}/videos
pub async fn add_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<AddVideoRequest>,
) -> Result<HttpResponse> {
    let playlist = owned_playlist(&state, path.into_inner(), current_user_id(&user)?).await?;
    let video = require_video(&state, body.video_id).await?;

    if !state
        .playlists
        .add_playlist_video(playlist.id, video.id, Utc::now())
        .await?
    {
        return Err(AppError::Conflict(
            "Video already in playlist".to_string(),
        ));
    }

    let updated = state
        .playlists
        .find_playlist(playlist.id)
        .await?
        .ok_or_else(playlist_not_found)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/v1/playlists/{id}/videos/{video_id}
pub async fn remove_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist = owned_playlist(&state, playlist_id, current_user_id(&user)?).await?;

    if !state
        .playlists
        .remove_playlist_video(playlist.id, video_id, Utc::now())
        .await?
    {
        return Err(AppError::NotFound("Video not in playlist".to_string()));
    }

    let updated = state
        .playlists
        .find_playlist(playlist.id)
        .await?
        .ok_or_else(playlist_not_found)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/v1/playlists/{id}
pub async fn delete_playlist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let playlist = owned_playlist(&state, path.into_inner(), current_user_id(&user)?).await?;
    state.playlists.delete_playlist(playlist.id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Playlist deleted successfully")))
}
