//! Bearer token authentication gate
//!
//! Per request: header present → `Bearer ` prefix → token verifies →
//! token not revoked → principal attached. Any failed edge ends the request
//! before the handler runs. Codec failures never reach the ledger.
//!
//! Logout uses [`AuthGate::for_logout`], which stops after the codec so an
//! already-revoked token can be revoked again.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use chrono::{DateTime, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};
use jwt_security::{LedgerError, RevocationLedger, TokenCodec, TokenError};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::metrics::record_gate_decision;

/// Principal attached to a request that passed the gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Opaque principal identifier from the token's `sub`
    pub subject: String,
    /// The exact bearer token presented, needed by logout
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum GateRejection {
    #[error("Authorization header is required")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    InvalidHeaderFormat,

    /// Signature, expiry and parse failures share one message.
    #[error("Invalid token")]
    InvalidToken(TokenError),

    #[error("Token has been revoked")]
    Revoked,

    #[error("Internal Server Error")]
    LedgerUnavailable(LedgerError),
}

impl GateRejection {
    fn outcome(&self) -> &'static str {
        match self {
            GateRejection::MissingHeader => "missing_header",
            GateRejection::InvalidHeaderFormat => "invalid_header",
            GateRejection::InvalidToken(_) => "invalid_token",
            GateRejection::Revoked => "revoked",
            GateRejection::LedgerUnavailable(_) => "ledger_error",
        }
    }
}

impl ResponseError for GateRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            GateRejection::LedgerUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

/// Header and codec checks only; the ledger is not consulted.
pub fn verify_bearer(
    authorization: Option<&str>,
    codec: &TokenCodec,
) -> Result<AuthenticatedUser, GateRejection> {
    let authorization = authorization.ok_or(GateRejection::MissingHeader)?;
    let token = authorization
        .strip_prefix("Bearer ")
        .ok_or(GateRejection::InvalidHeaderFormat)?;

    let claims = codec.verify(token).map_err(GateRejection::InvalidToken)?;

    Ok(AuthenticatedUser {
        expires_at: claims.expires_at(),
        subject: claims.sub,
        token: token.to_string(),
    })
}

/// Run the gate's checks against a raw `Authorization` header value.
///
/// A ledger failure rejects the request (fail closed).
pub async fn authenticate(
    authorization: Option<&str>,
    codec: &TokenCodec,
    ledger: &dyn RevocationLedger,
) -> Result<AuthenticatedUser, GateRejection> {
    let user = verify_bearer(authorization, codec)?;

    match ledger.is_revoked(&user.token).await {
        Ok(true) => Err(GateRejection::Revoked),
        Ok(false) => Ok(user),
        Err(e) => Err(GateRejection::LedgerUnavailable(e)),
    }
}

/// Middleware wrapping every protected resource.
#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    ledger: Arc<dyn RevocationLedger>,
    check_revocation: bool,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>, ledger: Arc<dyn RevocationLedger>) -> Self {
        Self {
            codec,
            ledger,
            check_revocation: true,
        }
    }

    /// Same gate without the revocation lookup, so logging out twice succeeds.
    pub fn for_logout(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            ledger: self.ledger.clone(),
            check_revocation: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            ledger: self.ledger.clone(),
            check_revocation: self.check_revocation,
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    ledger: Arc<dyn RevocationLedger>,
    check_revocation: bool,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let codec = self.codec.clone();
        let ledger = self.ledger.clone();
        let check_revocation = self.check_revocation;

        Box::pin(async move {
            // Non-UTF-8 header values cannot carry the prefix.
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .map(|value| value.to_str().unwrap_or_default());

            let outcome = if check_revocation {
                authenticate(authorization, &codec, ledger.as_ref()).await
            } else {
                verify_bearer(authorization, &codec)
            };

            match outcome {
                Ok(user) => {
                    record_gate_decision("authenticated");
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(rejection) => {
                    record_gate_decision(rejection.outcome());
                    match &rejection {
                        GateRejection::LedgerUnavailable(e) => {
                            error!(error = %e, path = %req.path(), "revocation check failed")
                        }
                        GateRejection::InvalidToken(e) => {
                            debug!(reason = %e, path = %req.path(), "rejected bearer token")
                        }
                        other => debug!(reason = %other, path = %req.path(), "request rejected"),
                    }
                    let response = rejection.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(GateRejection::MissingHeader.into())),
        }
    }
}
