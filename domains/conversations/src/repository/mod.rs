//! Repository implementations for Conversations domain

pub mod committer;
pub mod conversations;
pub mod messages;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

pub use committer::PgTranscriptCommitter;
pub use conversations::ConversationRepository;
pub use messages::MessageRepository;
pub use users::UserProfileRepository;

/// Combined repository access for the Conversations domain
#[derive(Clone)]
pub struct ConversationsRepositories {
    pool: PgPool,
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
    pub users: UserProfileRepository,
}

impl ConversationsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            users: UserProfileRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
