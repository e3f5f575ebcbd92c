use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
mod pages;
pub mod repo;
pub mod services;
pub mod token;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/confirm/:token", get(handlers::confirm))
        .route("/policy", get(handlers::policy))
}
