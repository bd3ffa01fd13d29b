pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::evaluation::handlers;
use crate::evaluation::upload::MAX_REQUEST_BYTES;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/cv-evaluate",
            get(handlers::handle_describe).post(handlers::handle_evaluate),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
