use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{current_user_id, MessageResponse};
use crate::error::{AppError, Result};
use crate::models::UserView;
use crate::services::{LoginIdentifier, NewAccount};
use crate::state::AppState;

// ============================================
// Request/Response Structs
// ============================================

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,

    #[validate(url)]
    pub avatar_url: Option<String>,

    #[validate(url)]
    pub cover_image_url: Option<String>,
}

/// Exactly one of `username` / `email` identifies the account; username wins
/// when both are sent.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub username: Option<String>,

    pub email: Option<String>,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100))]
    pub channel_name: String,
}

impl LoginRequest {
    fn identifier(&self) -> Result<LoginIdentifier> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(username) = present(&self.username) {
            Ok(LoginIdentifier::Username(username))
        } else if let Some(email) = present(&self.email) {
            Ok(LoginIdentifier::Email(email))
        } else {
            Err(AppError::BadRequest(
                "Username or email is required".to_string(),
            ))
        }
    }
}

// ============================================
// Handler Functions
// ============================================

/// POST /api/v1/users/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Either<web::Json<SignupRequest>, web::Form<SignupRequest>>,
) -> Result<HttpResponse> {
    let mut req = body.into_inner();
    // Length rules apply to what gets stored.
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_string();
    req.validate()?;

    let user = state
        .accounts
        .signup(NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            avatar_url: req.avatar_url,
            cover_image_url: req.cover_image_url,
        })
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// POST /api/v1/users/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;
    let identifier = req.identifier()?;

    let outcome = state.sessions.login(&identifier, &req.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token: outcome.token,
        user: outcome.user,
    }))
}

/// POST /api/v1/users/logout
///
/// Revokes exactly the presented token.
pub async fn logout(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse> {
    state.sessions.logout(&user.token, user.expires_at).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}

/// PUT /api/v1/users/change-password
pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let user_id = current_user_id(&user)?;

    state
        .accounts
        .change_password(user_id, &body.current_password, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password changed successfully")))
}

/// PUT /api/v1/users/channel
pub async fn create_channel(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Either<web::Json<CreateChannelRequest>, web::Form<CreateChannelRequest>>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;
    if req.channel_name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "invalid fields: channel_name".to_string(),
        ));
    }
    let user_id = current_user_id(&user)?;

    let updated = state
        .accounts
        .create_channel(user_id, &req.channel_name)
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// GET /api/v1/users/me
pub async fn me(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse> {
    let profile = state.accounts.profile(current_user_id(&user)?).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/users/subscriptions
pub async fn subscriptions(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let channels = state
        .subscriptions
        .subscribed_channels(current_user_id(&user)?)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "count": channels.len(),
        "channels": channels,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_request(username: Option<&str>, email: Option<&str>) -> LoginRequest {
        LoginRequest {
            username: username.map(str::to_string),
            email: email.map(str::to_string),
            password: "wonderland".into(),
        }
    }

    #[test]
    fn test_login_identifier_prefers_username() {
        let req = login_request(Some("alice"), Some("alice@example.com"));
        assert_eq!(
            req.identifier().unwrap(),
            LoginIdentifier::Username("alice".into())
        );

        let req = login_request(Some("  "), Some("alice@example.com"));
        assert_eq!(
            req.identifier().unwrap(),
            LoginIdentifier::Email("alice@example.com".into())
        );
    }

    #[test]
    fn test_login_identifier_required() {
        let req = login_request(None, None);
        assert!(matches!(req.identifier(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_signup_validation() {
        let req = SignupRequest {
            username: "al".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            avatar_url: None,
            cover_image_url: None,
        };
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(
            err.to_string(),
            "Validation error: invalid fields: email, password, username"
        );
    }
}
