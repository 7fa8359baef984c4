//! Prometheus metrics for Vidshare services
//!
//! Request series are labelled by matched route pattern (`/api/v1/videos/{id}`),
//! never by raw path, so video and user ids stay out of label values.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use prometheus::{HistogramVec, IntCounterVec};
use std::rc::Rc;
use std::time::Instant;

const UNMATCHED_ROUTE: &str = "unmatched";

lazy_static::lazy_static! {
    pub static ref VIDSHARE_HTTP_REQUESTS_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "vidshare_http_requests_total",
        "Vidshare API requests by method, route pattern and status",
        &["method", "route", "status"]
    ).expect("vidshare_http_requests_total registers once");

    pub static ref VIDSHARE_HTTP_REQUEST_DURATION_SECONDS: HistogramVec = prometheus::register_histogram_vec!(
        "vidshare_http_request_duration_seconds",
        "Vidshare API latency, gate time included",
        &["method", "route", "status"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).expect("vidshare_http_request_duration_seconds registers once");

    pub static ref VIDSHARE_AUTH_GATE_DECISIONS_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "vidshare_auth_gate_decisions_total",
        "Bearer token gate decisions by outcome",
        &["outcome"]
    ).expect("vidshare_auth_gate_decisions_total registers once");
}

pub fn record_gate_decision(outcome: &str) {
    VIDSHARE_AUTH_GATE_DECISIONS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

fn observe_request(method: &str, route: &str, status: u16, elapsed_secs: f64) {
    let status = status.to_string();
    let labels = [method, route, status.as_str()];
    VIDSHARE_HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();
    VIDSHARE_HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&labels)
        .observe(elapsed_secs);
}

/// Records a request counter and a latency observation per response.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = MetricsMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let started = Instant::now();
        let method = req.method().to_string();

        Box::pin(async move {
            let res = service.call(req).await?;
            let route = res
                .request()
                .match_pattern()
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

            observe_request(
                &method,
                &route,
                res.status().as_u16(),
                started.elapsed().as_secs_f64(),
            );

            Ok(res)
        })
    }
}
