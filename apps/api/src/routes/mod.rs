pub mod health;

use std::path::PathBuf;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;
use crate::tasks::handlers;

pub fn build_router(state: AppState) -> Router {
    let static_dir = PathBuf::from(&state.config.static_dir);
    let index = static_dir.join("index.html");

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/gemini", post(handlers::handle_ask))
        .route(
            "/api/chat",
            get(handlers::handle_chat_query).post(handlers::handle_chat),
        )
        // Front-end assets; unknown paths get the index page
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .with_state(state)
}
