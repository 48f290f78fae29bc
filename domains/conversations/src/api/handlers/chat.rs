//! Chat API handlers: streaming relay, single-shot chat, history

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use compass_auth::CallerUser;
use compass_common::{not_blank, Error, Result, ValidatedJson};
use compass_llm::{decode_frames, ChatRequest};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;
use validator::Validate;

use super::{caller_profile, owned_conversation, MessageResponse};
use crate::api::middleware::ConversationsState;
use crate::domain::access::authorize;
use crate::domain::entities::Message;
use crate::domain::relay::{spawn_relay, RelayEvent};
use crate::repository::transactions::{
    create_message_tx, lock_conversation_tx, seed_and_insert_user_tx,
};

/// Request body for both chat endpoints
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,

    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

/// Response for the single-shot chat endpoint
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub conversation_id: Uuid,
    pub user_message: MessageResponse,
    pub ai_message: MessageResponse,
}

/// Send a message and relay the AI answer as it is generated.
///
/// The user message (and any title seed) is stored before upstream is
/// contacted. The AI answer is stored by the relay once upstream finished.
pub async fn stream_message(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let conversation_id = req.conversation_id;
    owned_conversation(&state.repos, conversation_id, caller.id).await?;
    let profile = caller_profile(&state.repos, caller.id).await?;

    let mut tx = state.repos.begin().await?;
    let conversation = authorize(lock_conversation_tx(&mut tx, conversation_id).await?, caller.id)?;
    let user_message = Message::new_user(conversation_id, req.message.clone())?;
    let (_, seeded_title) = seed_and_insert_user_tx(&mut tx, &conversation, &user_message).await?;
    tx.commit().await?;

    if let Some(title) = &seeded_title {
        tracing::info!(%conversation_id, title = %title, "Seeded conversation title");
    }

    let request = ChatRequest {
        message: req.message,
        user_id: caller.id.to_string(),
        session_id: conversation_id.to_string(),
        user_profile: profile.to_profile(),
    };

    let lines = state.llm.stream(request).await.map_err(|e| {
        tracing::warn!(%conversation_id, error = %e, "AI stream could not be opened");
        Error::from(e)
    })?;

    tracing::info!(%conversation_id, user_id = %caller.id, "Relaying AI stream");
    let (rx, _pump) = spawn_relay(
        decode_frames(lines),
        state.committer.clone(),
        conversation_id,
        state.stream_idle_timeout,
    );

    let events = UnboundedReceiverStream::new(rx).map(|event| {
        Ok(match event {
            RelayEvent::Frame(frame) => Event::default().data(frame.payload()),
            RelayEvent::Failed(e) => Event::default().event("error").data(e.to_body().to_string()),
        })
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Send a message and wait for the complete AI answer.
///
/// Nothing is stored unless the AI service returned an answer; the user
/// message, AI message and title seed are then stored together.
pub async fn send_message(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let conversation_id = req.conversation_id;
    owned_conversation(&state.repos, conversation_id, caller.id).await?;
    let profile = caller_profile(&state.repos, caller.id).await?;
    let user_message = Message::new_user(conversation_id, req.message.clone())?;

    let reply = state
        .llm
        .complete(ChatRequest {
            message: req.message,
            user_id: caller.id.to_string(),
            session_id: conversation_id.to_string(),
            user_profile: profile.to_profile(),
        })
        .await?;

    let answer = reply
        .response
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::UpstreamUnavailable("AI service returned no content".to_string()))?;

    let mut tx = state.repos.begin().await?;
    let conversation = authorize(lock_conversation_tx(&mut tx, conversation_id).await?, caller.id)?;
    let (user_message, seeded_title) =
        seed_and_insert_user_tx(&mut tx, &conversation, &user_message).await?;
    let ai_message = Message::new_ai(conversation_id, answer, reply.search_source)?;
    let ai_message = create_message_tx(&mut tx, &ai_message).await?;
    tx.commit().await?;

    if let Some(title) = &seeded_title {
        tracing::info!(%conversation_id, title = %title, "Seeded conversation title");
    }

    Ok(Json(SendMessageResponse {
        conversation_id,
        user_message: user_message.into(),
        ai_message: ai_message.into(),
    }))
}

/// List the messages of a conversation in creation order
pub async fn history(
    CallerUser(caller): CallerUser,
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>> {
    owned_conversation(&state.repos, conversation_id, caller.id).await?;

    let messages = state
        .repos
        .messages
        .list_by_conversation(conversation_id)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
