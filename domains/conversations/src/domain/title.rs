//! Conversation title seeding
//!
//! A conversation keeps its placeholder title until the first user message
//! arrives; that message then names the conversation, once.

use super::entities::Conversation;

/// Title given to conversations created without one
pub const DEFAULT_TITLE: &str = "new conversation";

/// Characters of the first message kept in a derived title
pub const TITLE_MAX_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// Derive a title from a message: at most 30 characters, `...` when cut
pub fn derive_title(message: &str) -> String {
    match message.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &message[..cut], ELLIPSIS),
        None => message.to_string(),
    }
}

/// New title for a conversation, if this message is the one that seeds it.
///
/// `message_count` must be read before the message is stored.
pub fn seed_title(conversation: &Conversation, message_count: i64, message: &str) -> Option<String> {
    if message_count == 0 && conversation.has_placeholder_title() {
        Some(derive_title(message))
    } else {
        None
    }
}
