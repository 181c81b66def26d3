use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ChatId, Identity};

/// A chat message as returned by the message store.
///
/// Messages are never mutated or deleted by the relay once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Publicly accessible UUID
    pub id: Uuid,
    /// Chat this message belongs to
    pub chat_id: ChatId,
    /// Member who sent the message
    pub sender_id: Identity,
    /// Message content
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message stamped with a fresh id and the current time
    pub fn new(chat_id: ChatId, sender_id: Identity, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            sender_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
