//! # Actix Middleware Library
//!
//! Shared middleware for Vidshare Actix services
//!
//! ## Modules
//! - `auth_gate`: bearer token authentication with revocation check
//! - `correlation_id`: request correlation ids
//! - `metrics`: Prometheus HTTP and gate metrics

pub mod auth_gate;
pub mod correlation_id;
pub mod metrics;

pub use auth_gate::{authenticate, verify_bearer, AuthGate, AuthenticatedUser, GateRejection};
pub use correlation_id::{CorrelationId, CorrelationIdMiddleware};
pub use metrics::MetricsMiddleware;
