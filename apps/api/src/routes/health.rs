use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// Liveness plus whether a completion credential is present, so a missing key
/// shows up before the first analysis fails with 503.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "career-coach-api",
        "version": env!("CARGO_PKG_VERSION"),
        "completionConfigured": state.config.openrouter_api_key.is_some(),
        "candidateModels": state.analyzer.candidate_models().len()
    }))
}
