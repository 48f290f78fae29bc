//! Conversations domain state and auth backend integration

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use compass_auth::AuthBackend;
use compass_llm::LlmService;
use sqlx::PgPool;

use crate::domain::relay::TranscriptCommitter;
use crate::repository::{ConversationsRepositories, PgTranscriptCommitter};

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub repos: ConversationsRepositories,
    pub auth: AuthBackend,
    pub llm: Arc<dyn LlmService>,
    pub committer: Arc<dyn TranscriptCommitter>,
    /// Longest wait for the next upstream frame
    pub stream_idle_timeout: Duration,
}

impl ConversationsState {
    /// Wire the domain against one pool; the committer draws its own transactions from it
    pub fn new(pool: PgPool, llm: Arc<dyn LlmService>, stream_idle_timeout: Duration) -> Self {
        Self {
            repos: ConversationsRepositories::new(pool.clone()),
            auth: AuthBackend::new(pool.clone()),
            llm,
            committer: Arc::new(PgTranscriptCommitter::new(pool)),
            stream_idle_timeout,
        }
    }
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
