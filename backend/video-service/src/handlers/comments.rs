use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{current_user_id, require_video, MessageResponse, OffsetQuery};
use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

impl CommentRequest {
    fn checked_content(&self) -> Result<&str> {
        self.validate()?;
        let content = self.content.trim();
        if content.is_empty() {
            return Err(AppError::ValidationError(
                "invalid fields: content".to_string(),
            ));
        }
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub limit: i64,
    pub offset: i64,
}

async fn owned_comment(state: &AppState, comment_id: Uuid, user_id: Uuid) -> Result<Comment> {
    let comment = state
        .comments
        .find_comment(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.owner_id != user_id {
        return Err(AppError::Forbidden(
            "You can only modify your own comments".to_string(),
        ));
    }
    Ok(comment)
}

/// POST /api/v1/videos/{id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let content = body.checked_content()?;
    let video = require_video(&state, path.into_inner()).await?;

    let now = Utc::now();
    let comment = Comment {
        id: Uuid::new_v4(),
        video_id: video.id,
        owner_id: current_user_id(&user)?,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    };
    state.comments.create_comment(&comment).await?;

    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/v1/videos/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<OffsetQuery>,
) -> Result<HttpResponse> {
    let video = require_video(&state, path.into_inner()).await?;
    let (limit, offset) = query.resolve();
    let comments = state.comments.list_comments(video.id, limit, offset).await?;

    Ok(HttpResponse::Ok().json(CommentListResponse {
        comments,
        limit,
        offset,
    }))
}

/// PUT /api/v1/comments/{id}
pub async fn update_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let content = body.checked_content()?;
    let comment = owned_comment(&state, path.into_inner(), current_user_id(&user)?).await?;

    let updated = state
        .comments
        .update_comment(comment.id, content, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comment = owned_comment(&state, path.into_inner(), current_user_id(&user)?).await?;
    state.comments.delete_comment(comment.id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment deleted successfully")))
}
