//! `User-Id` header parsing

use axum::http::HeaderValue;
use uuid::Uuid;

use crate::error::AuthError;

/// Header carrying the caller's user ID
pub const USER_ID_HEADER: &str = "user-id";

/// Parse the caller's user ID from the header value
pub(crate) fn parse_user_id(header: &HeaderValue) -> Result<Uuid, AuthError> {
    let raw = header
        .to_str()
        .map_err(|_| AuthError::InvalidUserId)?
        .trim();

    Uuid::parse_str(raw).map_err(|_| AuthError::InvalidUserId)
}
