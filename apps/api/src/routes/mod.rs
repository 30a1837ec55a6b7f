pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/analyze-resume", post(handlers::handle_analyze_resume))
        .route("/api/analyze", post(handlers::handle_analyze_text))
        .route("/api/list-models", get(handlers::handle_list_models))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
