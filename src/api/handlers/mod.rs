//! Answer API endpoints

pub mod cache;
pub mod chat;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Routes mounted under `/api`
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/cache", delete(cache::clear))
        .route("/cache/search", post(cache::search))
        .route("/cache/stats", get(cache::stats))
}
