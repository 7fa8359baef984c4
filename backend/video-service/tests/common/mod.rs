//! Shared helpers for the HTTP integration tests
//!
//! Every app runs on the in-memory store and ledger, so no external
//! services are needed.

#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test, Error,
};
use jwt_security::TokenCodec;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use video_service::AppState;

pub const TEST_SECRET: &[u8] = b"integration-secret-Qw8Zx3Lp6Rv1Tn5Ks";

pub fn memory_state() -> AppState {
    AppState::in_memory(Arc::new(TokenCodec::new(TEST_SECRET)))
}

/// Build a test service with the production routes over `$state`.
macro_rules! test_app {
    ($state:expr) => {{
        let state: video_service::AppState = $state;
        let gate = state.auth_gate();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(|cfg| video_service::routes::configure(cfg, gate)),
        )
        .await
    }};
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub async fn call<S, B>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn signup<S, B>(app: &S, username: &str, password: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/signup")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password,
        }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, 201, "signup failed: {}", body);
    body
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    call(app, req).await
}

/// Sign up and log in; returns the new user's id and bearer token.
pub async fn register<S, B>(app: &S, username: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let password = "correct-horse-battery";
    signup(app, username, password).await;
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, 200, "login failed: {}", body);

    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("login response carries the user id"),
        token: body["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string(),
    }
}

/// Give the user a channel so their uploads can be subscribed to.
pub async fn open_channel<S, B>(app: &S, user: &TestUser, name: &str) -> Uuid
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::put()
        .uri("/api/v1/users/channel")
        .insert_header(user.bearer())
        .set_json(json!({ "channel_name": name }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, 200, "channel creation failed: {}", body);
    Uuid::parse_str(body["channel_id"].as_str().unwrap()).unwrap()
}

pub async fn upload<S, B>(app: &S, user: &TestUser, title: &str) -> Uuid
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .insert_header(user.bearer())
        .set_json(json!({
            "title": title,
            "url": "https://cdn.example.com/v/clip.mp4",
            "duration_seconds": 3725,
        }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, 201, "upload failed: {}", body);
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}
