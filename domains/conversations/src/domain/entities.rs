//! Domain entities for the Conversations domain
//!
//! Conversations own an ordered transcript of messages. Messages are
//! immutable once stored and are ordered by `created_at` ascending.

use chrono::{DateTime, Utc};
use compass_llm::UserProfile;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use compass_common::{Error, Result};

use super::title::DEFAULT_TITLE;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Ai,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "USER"),
            MessageRole::Ai => write!(f, "AI"),
        }
    }
}

/// Maximum title string length (varchar(500))
pub const MAX_TITLE_LENGTH: usize = 500;

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation; a missing or blank title becomes the placeholder
    pub fn new(user_id: Uuid, title: Option<String>) -> Result<Self> {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => DEFAULT_TITLE.to_string(),
        };

        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        Ok(Conversation {
            id: Uuid::new_v4(),
            user_id,
            title,
            created_at: Utc::now(),
        })
    }

    /// Whether the title is still the placeholder set at creation
    pub fn has_placeholder_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub sources: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn new_user(conversation_id: Uuid, content: String) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }

        Ok(Self::build(conversation_id, MessageRole::User, content, None))
    }

    /// Create a new AI message from a completed answer
    pub fn new_ai(conversation_id: Uuid, content: String, sources: Option<String>) -> Result<Self> {
        if content.is_empty() {
            return Err(Error::Validation("AI answer cannot be empty".to_string()));
        }

        let sources = sources.filter(|s| !s.is_empty());
        Ok(Self::build(conversation_id, MessageRole::Ai, content, sources))
    }

    fn build(
        conversation_id: Uuid,
        role: MessageRole,
        content: String,
        sources: Option<String>,
    ) -> Self {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content,
            sources,
            created_at: Utc::now(),
        }
    }
}

/// Profile columns of a `users` row
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub name: String,
    pub residence: Option<String>,
    pub age: Option<i32>,
    pub salary: Option<Decimal>,
    pub assets: Option<Decimal>,
    pub note: Option<String>,
    pub agree_privacy: bool,
}

impl ProfileRecord {
    /// Build the profile sent upstream; personal fields stay empty without consent
    pub fn to_profile(&self) -> UserProfile {
        if !self.agree_privacy {
            return UserProfile::default();
        }

        UserProfile {
            name: Some(self.name.clone()),
            residence: self.residence.clone(),
            age: self.age,
            salary: self.salary,
            assets: self.assets,
            note: self.note.clone(),
            agree_privacy: true,
        }
    }
}
