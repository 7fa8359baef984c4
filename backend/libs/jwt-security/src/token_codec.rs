//! HS256 token codec
//!
//! Tokens are compact JWTs (`header.claims.signature`, base64url segments)
//! carrying `{sub, iat, nbf, exp, jti}`. Validity is decided from the bytes
//! and the shared secret alone; revocation lives in the ledger.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::secret_validation::{validate_secret_strength, SecretStrength};

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Used only when `JWT_SECRET` is absent outside production.
const DEVELOPMENT_FALLBACK_SECRET: &str = "vidshare-development-secret";

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal identifier)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id, makes every issued string distinct
    pub jti: String,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Verification failures. The HTTP layer collapses all of them into one
/// "Invalid token" response; the variants exist for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired or not yet valid")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Error)]
pub enum CodecInitError {
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingSecret,
}

/// Issues and verifies HS256 tokens with a fixed lifetime.
///
/// Built once at startup and shared behind an `Arc`.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Build the codec from the configured secret.
    ///
    /// A missing secret falls back to a development value with a warning,
    /// except in production where it is refused. Weak secrets are accepted
    /// but logged.
    pub fn from_configured_secret(
        secret: Option<String>,
        ttl: Duration,
        production: bool,
    ) -> Result<Self, CodecInitError> {
        match secret {
            Some(mut secret) if !secret.trim().is_empty() => {
                if validate_secret_strength(&secret) == SecretStrength::Weak {
                    warn!("JWT_SECRET is weak; use at least 32 random bytes");
                }
                let codec = Self::with_ttl(secret.as_bytes(), ttl);
                secret.zeroize();
                Ok(codec)
            }
            _ if production => Err(CodecInitError::MissingSecret),
            _ => {
                warn!("JWT_SECRET is not set; using the built-in development secret");
                Ok(Self::with_ttl(DEVELOPMENT_FALLBACK_SECRET.as_bytes(), ttl))
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from now for the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token whose validity window starts at `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, structure and validity window.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let mapped = match e.kind() {
                    ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
                        TokenError::Expired
                    }
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                };
                debug!(error = %e, outcome = ?mapped, "token verification failed");
                mapped
            })
    }
}
