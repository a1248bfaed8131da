use axum::Json;
use serde_json::{json, Value};

use crate::tasks::kind::TaskKind;

/// GET /
/// Plain-text liveness string.
pub async fn root_handler() -> &'static str {
    "Parley API is running"
}

/// GET /health
/// Returns a simple status object with service version and the supported task kinds.
pub async fn health_handler() -> Json<Value> {
    let tasks: Vec<String> = TaskKind::RECOGNIZED
        .iter()
        .map(|kind| kind.name().to_string())
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "parley-api",
        "tasks": tasks
    }))
}
