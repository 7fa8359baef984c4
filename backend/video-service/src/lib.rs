//! Vidshare video service
//!
//! Accounts, channels, video metadata, engagement (likes, subscriptions,
//! comments), playlists and watch history over a REST API. Sessions are
//! bearer tokens checked by the `actix-middleware` auth gate; logout
//! revokes the exact token presented.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
