//! Postgres-backed transcript commit

use async_trait::async_trait;
use compass_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::create_message_tx;
use crate::domain::entities::Message;
use crate::domain::relay::TranscriptCommitter;
use crate::domain::transcript::Transcript;

/// Stores a completed stream's AI answer in a transaction of its own
#[derive(Clone)]
pub struct PgTranscriptCommitter {
    pool: PgPool,
}

impl PgTranscriptCommitter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranscriptCommitter for PgTranscriptCommitter {
    async fn commit(&self, conversation_id: Uuid, transcript: Transcript) -> Result<Message> {
        let message = Message::new_ai(conversation_id, transcript.answer, transcript.sources)?;

        let mut tx = self.pool.begin().await?;
        match create_message_tx(&mut tx, &message).await {
            Ok(stored) => {
                tx.commit().await?;
                Ok(stored)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback of AI answer insert failed");
                }
                Err(e.into())
            }
        }
    }
}
