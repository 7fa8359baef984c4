use actix_web::{web, HttpResponse};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::time::Instant;
use tracing::error;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

/// Liveness
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness: the storage backend answers a trivial query.
///
/// Returns 503 when PostgreSQL is unreachable.
pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let Some(pool) = state.pool.as_ref() else {
        return HttpResponse::Ok().json(ReadinessResponse {
            ready: true,
            storage: "memory",
            latency_ms: None,
        });
    };

    let start = Instant::now();
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => HttpResponse::Ok().json(ReadinessResponse {
            ready: true,
            storage: "postgres",
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }),
        Err(e) => {
            error!(error = %e, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(ReadinessResponse {
                ready: false,
                storage: "postgres",
                latency_ms: None,
            })
        }
    }
}

/// Prometheus text exposition of the default registry
pub async fn metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
