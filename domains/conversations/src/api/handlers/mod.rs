//! HTTP handlers for the Conversations domain

pub mod chat;
pub mod conversations;

use chrono::{DateTime, Utc};
use compass_common::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::access::authorize;
use crate::domain::entities::{Conversation, Message, MessageRole, ProfileRecord};
use crate::repository::ConversationsRepositories;

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub sources: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            role: m.role,
            content: m.content,
            sources: m.sources,
            created_at: m.created_at,
        }
    }
}

/// Load a conversation and check the caller owns it. Reads only.
pub(crate) async fn owned_conversation(
    repos: &ConversationsRepositories,
    conversation_id: Uuid,
    caller_id: Uuid,
) -> Result<Conversation> {
    let conversation = repos.conversations.find(conversation_id).await?;
    authorize(conversation, caller_id)
}

/// Load the caller's profile row
pub(crate) async fn caller_profile(
    repos: &ConversationsRepositories,
    user_id: Uuid,
) -> Result<ProfileRecord> {
    repos
        .users
        .find_profile(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}
