use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint, used by the platform's liveness probe.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let cfg = state.predictor.config();
    Json(json!({
        "status": "ok",
        "mode": cfg.mode.to_string(),
        "interval": cfg.interval,
    }))
}
