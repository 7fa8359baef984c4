//! Route configuration
//!
//! Protected resources are wrapped with the gate individually. Paths that
//! mix public reads with protected writes are split into two resources
//! selected by method guard.

use actix_middleware::AuthGate;
use actix_web::{guard, web, HttpRequest};

use crate::error::AppError;
use crate::handlers::{comments, engagement, health, playlists, users, videos, watch_history};

/// Configure all routes for the application
pub fn configure(cfg: &mut web::ServiceConfig, gate: AuthGate) {
    cfg.app_data(json_config())
        .app_data(form_config())
        .app_data(path_config())
        .app_data(query_config())
        .route("/metrics", web::get().to(health::metrics))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health::health_check))
                .route("/health/ready", web::get().to(health::readiness_check))
                .configure(|cfg| configure_users(cfg, &gate))
                .configure(|cfg| configure_videos(cfg, &gate))
                .configure(|cfg| configure_engagement(cfg, &gate))
                .configure(|cfg| configure_comments(cfg, &gate))
                .configure(|cfg| configure_playlists(cfg, &gate))
                .configure(|cfg| configure_watch_history(cfg, &gate)),
        );
}

fn configure_users(cfg: &mut web::ServiceConfig, gate: &AuthGate) {
    cfg.route("/users/signup", web::post().to(users::signup))
        .route("/users/login", web::post().to(users::login))
        .service(
            web::resource("/users/logout")
                .wrap(gate.for_logout())
                .route(web::post().to(users::logout)),
        )
        .service(
            web::resource("/users/change-password")
                .wrap(gate.clone())
                .route(web::put().to(users::change_password)),
        )
        .service(
            web::resource("/users/channel")
                .wrap(gate.clone())
                .route(web::put().to(users::create_channel)),
        )
        .service(
            web::resource("/users/me")
                .wrap(gate.clone())
                .route(web::get().to(users::me)),
        )
        .service(
            web::resource("/users/subscriptions")
                .wrap(gate.clone())
                .route(web::get().to(users::subscriptions)),
        );
}

fn configure_videos(cfg: &mut web::ServiceConfig, gate: &AuthGate) {
    cfg.service(
        web::resource("/videos")
            .wrap(gate.clone())
            .route(web::post().to(videos::create_video)),
    )
    .service(
        web::resource("/videos/{id}")
            .guard(guard::Get())
            .route(web::get().to(videos::get_video)),
    )
    .service(
        web::resource("/videos/{id}")
            .guard(guard::Delete())
            .wrap(gate.clone())
            .route(web::delete().to(videos::delete_video)),
    )
    .route("/videos/{id}/views", web::post().to(videos::record_view));
}

fn configure_engagement(cfg: &mut web::ServiceConfig, gate: &AuthGate) {
    cfg.service(
        web::resource("/videos/{id}/like")
            .wrap(gate.clone())
            .route(web::post().to(engagement::like_video))
            .route(web::delete().to(engagement::unlike_video)),
    )
    .route("/videos/{id}/likes", web::get().to(engagement::like_count))
    .service(
        web::resource("/videos/{id}/subscription")
            .wrap(gate.clone())
            .route(web::post().to(engagement::subscribe))
            .route(web::delete().to(engagement::unsubscribe)),
    )
    .route(
        "/channels/{id}/subscribers/count",
        web::get().to(engagement::subscriber_count),
    );
}

fn configure_comments(cfg: &mut web::ServiceConfig, gate: &AuthGate) {
    cfg.service(
        web::resource("/videos/{id}/comments")
            .guard(guard::Get())
            .route(web::get().to(comments::list_comments)),
    )
    .service(
        web::resource("/videos/{id}/comments")
            .guard(guard::Post())
            .wrap(gate.clone())
            .route(web::post().to(comments::create_comment)),
    )
    .service(
        web::resource("/comments/{id}")
            .wrap(gate.clone())
            .route(web::put().to(comments::update_comment))
            .route(web::delete().to(comments::delete_comment)),
    );
}

fn configure_playlists(cfg: &mut web::ServiceConfig, gate: &AuthGate) {
    cfg.service(
        web::resource("/playlists")
            .wrap(gate.clone())
            .route(web::post().to(playlists::create_playlist)),
    )
    .service(
        web::resource("/playlists/{id}")
            .wrap(gate.clone())
            .route(web::get().to(playlists::get_playlist))
            .route(web::delete().to(playlists::delete_playlist)),
    )
    .service(
        web::resource("/playlists/{id}/videos")
            .wrap(gate.clone())
            .route(web::post().to(playlists::add_video)),
    )
    .service(
        web::resource("/playlists/{id}/videos/{video_id}")
            .wrap(gate.clone())
            .route(web::delete().to(playlists::remove_video)),
    );
}

fn configure_watch_history(cfg: &mut web::ServiceConfig, gate: &AuthGate) {
    cfg.service(
        web::resource("/watch-history")
            .wrap(gate.clone())
            .route(web::post().to(watch_history::record_watch))
            .route(web::get().to(watch_history::list_history)),
    )
    .service(
        web::resource("/watch-history/{video_id}")
            .wrap(gate.clone())
            .route(web::delete().to(watch_history::remove_from_history)),
    );
}

// Extractor failures render through `AppError` so every 4xx has the same body.

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req: &HttpRequest| {
        AppError::BadRequest("Invalid identifier in path".to_string()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}
