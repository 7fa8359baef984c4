//! Session lifecycle: login mints a token, logout revokes it.

use chrono::{DateTime, Utc};
use jwt_security::{LedgerError, RevocationLedger, TokenCodec, TokenError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{StoreError, UserRepository};
use crate::models::{User, UserView};
use crate::security::password::{verify_password, PasswordError};

/// Upper bound on re-issuing when a fresh token is already in the ledger.
pub const MAX_ISSUE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Username(String),
    Email(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("User not found")]
    PrincipalNotFound,

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("token issuance failed: {0}")]
    Token(#[from] TokenError),

    #[error("revocation ledger failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("could not issue an unrevoked token after {MAX_ISSUE_ATTEMPTS} attempts")]
    IssuanceExhausted,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserView,
}

pub struct SessionService {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
    ledger: Arc<dyn RevocationLedger>,
    check_collisions: bool,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        codec: Arc<TokenCodec>,
        ledger: Arc<dyn RevocationLedger>,
    ) -> Self {
        Self {
            users,
            codec,
            ledger,
            check_collisions: true,
        }
    }

    /// Skip the post-issuance ledger lookup on login.
    pub fn without_collision_check(mut self) -> Self {
        self.check_collisions = false;
        self
    }

    pub async fn login(
        &self,
        identifier: &LoginIdentifier,
        password: &str,
    ) -> Result<LoginOutcome, SessionError> {
        let user = self
            .find_principal(identifier)
            .await?
            .ok_or(SessionError::PrincipalNotFound)?;

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(SessionError::InvalidCredential);
        }

        let token = self.issue_unrevoked(&user.id.to_string()).await?;
        info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            token,
            user: UserView::from(&user),
        })
    }

    /// Revoke exactly this token. Other sessions of the same user stay valid.
    pub async fn logout(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), SessionError> {
        self.ledger.revoke(token, expires_at).await?;
        info!("session token revoked");
        Ok(())
    }

    async fn find_principal(&self, identifier: &LoginIdentifier) -> Result<Option<User>, StoreError> {
        match identifier {
            LoginIdentifier::Username(username) => self.users.find_by_username(username).await,
            LoginIdentifier::Email(email) => {
                self.users
                    .find_by_email(&email.trim().to_lowercase())
                    .await
            }
        }
    }

    async fn issue_unrevoked(&self, subject: &str) -> Result<String, SessionError> {
        if !self.check_collisions {
            return Ok(self.codec.issue(subject)?);
        }

        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let token = self.codec.issue(subject)?;
            if !self.ledger.is_revoked(&token).await? {
                return Ok(token);
            }
            warn!(attempt, "freshly issued token already revoked; reissuing");
        }

        Err(SessionError::IssuanceExhausted)
    }
}
