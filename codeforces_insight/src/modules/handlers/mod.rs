pub mod compare;
pub mod team;
pub mod user;

use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

/// Uniform success envelope; errors are shaped by `ApiError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
