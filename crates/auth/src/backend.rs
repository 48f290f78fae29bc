//! Concrete identity backend
//!
//! Wraps `PgPool` and owns the identity lookup query. Uses runtime
//! `sqlx::query_as` (not macros), matching the repositories.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Identity backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
}

impl AuthBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find user identity by ID
    pub(crate) async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        let user: Option<AuthIdentity> = sqlx::query_as(
            r#"
            SELECT id, login_id, name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })?;

        Ok(user)
    }

    /// Resolve the caller identified by `user_id`
    pub(crate) async fn authenticate(&self, user_id: Uuid) -> Result<AuthIdentity, AuthError> {
        self.find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
