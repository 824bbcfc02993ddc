use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness plus an engine reachability probe.
///
/// Reports 503 when the engine stops answering so an orchestrator can
/// recycle the instance instead of routing jobs into a dead engine.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.api.system_stats().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "engine": "up" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: engine unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "engine": "down" })),
            )
        }
    }
}
