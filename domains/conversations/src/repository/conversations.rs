//! Conversation repository

use crate::domain::entities::Conversation;
use compass_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const CONVERSATION_COLUMNS: &str = "id, user_id, title, created_at";

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find conversation by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Conversation>> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
        let conv = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conv)
    }

    /// List conversations for a user, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE user_id = $1 \
             ORDER BY created_at DESC"
        );
        let convs = sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(convs)
    }

    /// Create a new conversation
    pub async fn create(&self, conv: &Conversation) -> Result<Conversation> {
        let query = format!(
            "INSERT INTO conversations ({CONVERSATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Conversation>(&query)
            .bind(conv.id)
            .bind(conv.user_id)
            .bind(&conv.title)
            .bind(conv.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Delete a conversation; its messages go with it
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
