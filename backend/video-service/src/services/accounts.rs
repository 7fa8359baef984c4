use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{Channel, User, UserView};
use crate::security::password::{hash_password, verify_password};

/// Input for [`AccountService::signup`]
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=20;

/// Account lifecycle outside of sessions: registration, password and channel.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn signup(&self, account: NewAccount) -> Result<UserView> {
        let username = account.username.trim();
        if !USERNAME_LENGTH.contains(&username.chars().count()) {
            return Err(AppError::ValidationError(
                "invalid fields: username".to_string(),
            ));
        }

        let password_hash = hash_password(&account.password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: account.email.trim().to_lowercase(),
            password_hash,
            avatar_url: account.avatar_url,
            cover_image_url: account.cover_image_url,
            channel_id: None,
            created_at: now,
            updated_at: now,
        };

        self.users.create_user(&user).await?;
        info!(user_id = %user.id, "account created");

        Ok(UserView::from(&user))
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserView> {
        let user = self.load(user_id).await?;
        Ok(UserView::from(&user))
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.load(user_id).await?;

        if !verify_password(current_password, &user.password_hash)? {
            warn!(user_id = %user_id, "password change rejected: wrong current password");
            return Err(AppError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(new_password)?;
        if !self
            .users
            .update_password(user_id, &password_hash, Utc::now())
            .await?
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, "password changed");
        Ok(())
    }

    pub async fn create_channel(&self, user_id: Uuid, name: &str) -> Result<UserView> {
        let now = Utc::now();
        let channel = Channel {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        let user = self
            .users
            .create_channel(user_id, &channel)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!(user_id = %user_id, channel_id = %channel.id, "channel created");
        Ok(UserView::from(&user))
    }

    async fn load(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use actix_web::ResponseError;

    fn alice() -> NewAccount {
        NewAccount {
            username: "alice".into(),
            email: "Alice@Example.com".into(),
            password: "wonderland".into(),
            avatar_url: None,
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn test_signup_normalizes_email() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));

        let view = accounts.signup(alice()).await.unwrap();

        assert_eq!(view.username, "alice");
        assert_eq!(view.email, "alice@example.com");
        assert!(view.channel_id.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));
        accounts.signup(alice()).await.unwrap();

        let mut same_email = alice();
        same_email.username = "alice2".into();
        let err = accounts.signup(same_email).await.unwrap_err();

        assert_eq!(err.status_code().as_u16(), 409);
    }

    #[tokio::test]
    async fn test_padded_username_is_measured_trimmed() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));

        for username in ["   ", "  a  ", " ab "] {
            let mut account = alice();
            account.username = username.into();
            let err = accounts.signup(account).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        let mut padded = alice();
        padded.username = "  bob  ".into();
        assert_eq!(accounts.signup(padded).await.unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_short_password_is_validation_error() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));
        let mut account = alice();
        account.password = "short".into();

        let err = accounts.signup(account).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        let user = accounts.signup(alice()).await.unwrap();

        let err = accounts
            .change_password(user.id, "not-my-password", "through-the-glass")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        accounts
            .change_password(user.id, "wonderland", "through-the-glass")
            .await
            .unwrap();
        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(
            verify_password("through-the-glass", &stored.password_hash),
            Ok(true)
        );
    }

    #[tokio::test]
    async fn test_one_channel_per_user() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));
        let user = accounts.signup(alice()).await.unwrap();

        let updated = accounts.create_channel(user.id, " Rabbit Hole ").await.unwrap();
        assert!(updated.channel_id.is_some());

        let err = accounts.create_channel(user.id, "Second").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_channel_for_unknown_user() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()));

        let err = accounts
            .create_channel(Uuid::new_v4(), "Nowhere")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
