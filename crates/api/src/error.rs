//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::ConflictError;
use lifecycle::LifecycleError;

/// Body of every 404 for an unknown rental request.
pub const NOT_FOUND_MESSAGE: &str = "Rental request not found";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Transition guard failed.
    Conflict(ConflictError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "message": msg })),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "message": msg }))
            }
            ApiError::Conflict(err) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "message": err.to_string(),
                    "status": err.current,
                }),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(_) => ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()),
            LifecycleError::Conflict(conflict) => ApiError::Conflict(conflict),
            LifecycleError::Invalid(invalid) => ApiError::BadRequest(invalid.to_string()),
            LifecycleError::Store(store) => ApiError::Internal(store.to_string()),
        }
    }
}
