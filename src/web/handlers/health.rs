use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
