//! Identity read-model types
//!
//! Lightweight view of the `users` row, carrying only the fields needed to
//! identify the caller. Profile data is loaded by the conversations domain.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity of the authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub login_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
