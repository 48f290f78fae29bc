//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{chat, conversations};
use super::middleware::ConversationsState;

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/v1/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/v1/conversations/{id}",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
}

/// Create chat routes
fn chat_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/v1/chat", post(chat::send_message))
        .route("/v1/chat/stream", post(chat::stream_message))
        .route(
            "/v1/chat/history/{conversation_id}",
            get(chat::history),
        )
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(chat_routes())
}
