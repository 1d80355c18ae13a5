use axum::Json;
use serde_json::{Value, json};

pub async fn root() -> &'static str {
    "Welcome to Pet Paradise API!"
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
    }))
}
