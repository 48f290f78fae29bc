//! Conversation ownership checks

use compass_common::{Error, Result};
use uuid::Uuid;

use super::entities::Conversation;

/// Allow `caller_id` to act on a loaded conversation.
///
/// Missing conversations are `NotFound`; another user's are `Forbidden`.
pub fn authorize(conversation: Option<Conversation>, caller_id: Uuid) -> Result<Conversation> {
    let conversation =
        conversation.ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

    if conversation.user_id != caller_id {
        return Err(Error::Forbidden(
            "Conversation belongs to another user".to_string(),
        ));
    }

    Ok(conversation)
}
