//! Transaction helpers for Conversations domain

use super::conversations::CONVERSATION_COLUMNS;
use super::messages::MESSAGE_COLUMNS;
use crate::domain::entities::{Conversation, Message};
use crate::domain::title::seed_title;
use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Lock a conversation row for the rest of the transaction.
/// Serializes concurrent first messages so only one of them seeds the title.
pub async fn lock_conversation_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Conversation>, sqlx::Error> {
    let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, Conversation>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Count stored messages of a conversation within a transaction
pub async fn count_messages_tx(
    tx: &mut Transaction<'_, Postgres>,
    conversation_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(count)
}

/// Replace a conversation's title within a transaction
pub async fn update_title_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    title: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE conversations SET title = $2 WHERE id = $1")
        .bind(id)
        .bind(title)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Insert a message within a transaction
pub async fn create_message_tx(
    tx: &mut Transaction<'_, Postgres>,
    msg: &Message,
) -> Result<Message, sqlx::Error> {
    let query = format!(
        "INSERT INTO messages ({MESSAGE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {MESSAGE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Message>(&query)
        .bind(msg.id)
        .bind(msg.conversation_id)
        .bind(msg.role)
        .bind(&msg.content)
        .bind(&msg.sources)
        .bind(msg.created_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Seed the title from the first message if still the placeholder, then
/// store the user message. Returns the stored message and the new title
/// when one was set.
///
/// The caller must already hold the row lock from [`lock_conversation_tx`].
/// The message is stamped under that lock, so transcript order follows the
/// order in which concurrent senders acquired it.
pub async fn seed_and_insert_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    conversation: &Conversation,
    msg: &Message,
) -> Result<(Message, Option<String>), sqlx::Error> {
    let count = count_messages_tx(tx, conversation.id).await?;
    let seeded = seed_title(conversation, count, &msg.content);
    if let Some(title) = &seeded {
        update_title_tx(tx, conversation.id, title).await?;
    }

    let msg = Message {
        created_at: Utc::now(),
        ..msg.clone()
    };
    let stored = create_message_tx(tx, &msg).await?;
    Ok((stored, seeded))
}
