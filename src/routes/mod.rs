use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

pub mod extract;
pub mod health;
pub mod metrics;

/// Application routes, without the metrics endpoint or middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health::health_check))
        .route("/extract-text", post(extract::extract_text))
        .with_state(state)
}

/// GET / — liveness text.
async fn home() -> &'static str {
    "PDF Extractor is running!"
}
