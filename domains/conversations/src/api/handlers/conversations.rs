//! Conversation management API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use compass_auth::CallerUser;
use compass_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{owned_conversation, MessageResponse};
use crate::api::middleware::ConversationsState;
use crate::domain::entities::Conversation;

/// Request for creating a conversation
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateConversationRequest {
    /// Optional title; the placeholder is used when absent or blank.
    /// Bound matches `MAX_TITLE_LENGTH`.
    #[validate(length(max = 500))]
    pub title: Option<String>,
}

/// Conversation response DTO
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            title: c.title,
            created_at: c.created_at,
        }
    }
}

/// Conversation with its transcript
#[derive(Debug, Serialize)]
pub struct ConversationDetailResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

/// Create a new conversation
pub async fn create_conversation(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let conversation = Conversation::new(caller.id, req.title)?;
    let created = state.repos.conversations.create(&conversation).await?;

    tracing::info!(conversation_id = %created.id, user_id = %caller.id, "Conversation created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List conversations of the calling user, newest first
pub async fn list_conversations(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<ConversationResponse>>> {
    let convs = state.repos.conversations.list_by_user(caller.id).await?;
    Ok(Json(convs.into_iter().map(Into::into).collect()))
}

/// Get a single conversation with its messages
pub async fn get_conversation(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationDetailResponse>> {
    let conv = owned_conversation(&state.repos, id, caller.id).await?;
    let messages = state.repos.messages.list_by_conversation(id).await?;

    Ok(Json(ConversationDetailResponse {
        conversation: conv.into(),
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// Delete a conversation and its messages
pub async fn delete_conversation(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    owned_conversation(&state.repos, id, caller.id).await?;
    state.repos.conversations.delete(id).await?;

    tracing::info!(conversation_id = %id, "Conversation deleted");
    Ok(StatusCode::NO_CONTENT)
}
