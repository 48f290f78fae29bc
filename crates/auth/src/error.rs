//! Caller identity errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Caller identity error
#[derive(Debug)]
pub enum AuthError {
    MissingUserId,
    InvalidUserId,
    UserNotFound,
    UserLoadError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingUserId => (
                StatusCode::UNAUTHORIZED,
                "MISSING_USER_ID",
                "User-Id header required",
            ),
            AuthError::InvalidUserId => (
                StatusCode::UNAUTHORIZED,
                "INVALID_USER_ID",
                "User-Id header must be a UUID",
            ),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "User not found"),
            AuthError::UserLoadError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_LOAD_ERROR",
                "Failed to load user",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
