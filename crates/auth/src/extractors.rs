//! Axum extractors for the calling user
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::backend::AuthBackend;
use crate::error::AuthError;
use crate::header::{parse_user_id, USER_ID_HEADER};
use crate::types::AuthIdentity;

/// Calling user, resolved from the `User-Id` header
#[derive(Debug)]
pub struct CallerUser(pub AuthIdentity);

impl<S> FromRequestParts<S> for CallerUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AuthError::MissingUserId)?;

        let user_id = parse_user_id(header)?;
        let identity = backend.authenticate(user_id).await?;

        Ok(CallerUser(identity))
    }
}
