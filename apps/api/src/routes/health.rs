use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// Reports whether the database answers.
pub async fn healthcheck(Extension(state): Extension<SharedState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}
