use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, the configured model, and whether a key is present.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ats-api",
        "model": state.config.gemini_model,
        "api_key_configured": state.config.google_api_key.is_some(),
        "active_sessions": state.controller.sessions().len().await,
    }))
}
