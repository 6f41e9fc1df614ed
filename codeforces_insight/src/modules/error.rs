use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codeforces_insight_libs::codeforces::client::CodeforcesError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::modules::teams::store::TeamStoreError;

#[derive(Debug, Clone, Serialize)]
pub struct InvalidHandle {
    pub field: String,
    pub value: String,
}

/// Boundary error for every handler. Each variant pins one HTTP status and
/// the uniform `{"success": false, ...}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{message}")]
    InvalidHandles {
        message: String,
        details: Vec<InvalidHandle>,
    },
    #[error("some usernames are invalid")]
    InvalidMembers { invalid_members: Vec<String> },
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    External(#[from] CodeforcesError),
    #[error(transparent)]
    Store(#[from] TeamStoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": message}),
            ),
            ApiError::InvalidHandles { message, details } => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": message, "details": details}),
            ),
            ApiError::InvalidMembers { invalid_members } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "Some usernames are invalid",
                    "invalidMembers": invalid_members,
                }),
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({"success": false, "error": message}),
            ),
            ApiError::External(CodeforcesError::HandleNotFound(comment)) => {
                tracing::warn!("unknown handle reported by upstream: {}", comment);
                (
                    StatusCode::NOT_FOUND,
                    json!({"success": false, "error": "User not found on Codeforces"}),
                )
            }
            ApiError::External(e) => {
                tracing::error!("codeforces api failure: {:?}", e);
                let message = match e {
                    CodeforcesError::ApiError(comment) => comment,
                    _ => String::from("External API error"),
                };
                (
                    StatusCode::BAD_GATEWAY,
                    json!({"success": false, "error": message}),
                )
            }
            ApiError::Store(e) => {
                tracing::error!("team store failure: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"success": false, "error": "Internal server error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let response = ApiError::Validation(String::from("bad input")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound(String::from("Team not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_handle_maps_to_404() {
        let response = ApiError::External(CodeforcesError::HandleNotFound(String::from(
            "handles: User with handle foo not found",
        )))
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failure_maps_to_502() {
        let response =
            ApiError::External(CodeforcesError::ApiError(String::from("call limit exceeded")))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_members_maps_to_400() {
        let response = ApiError::InvalidMembers {
            invalid_members: vec![String::from("nonexistentuser12345")],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
