//! Health check.

use axum::Json;
use serde_json::{Value, json};

/// Report that the server is up.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
