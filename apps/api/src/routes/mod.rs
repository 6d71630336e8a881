pub mod health;
pub mod ui;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/search", post(handlers::handle_search))
        .route("/api/v1/trends", post(handlers::handle_trends))
        .route(
            "/api/v1/trend-categories",
            get(handlers::handle_trend_categories),
        )
        .with_state(state)
}
