//! Repository for message data access operations.

use async_trait::async_trait;
use chrono::SecondsFormat;
use relay_chats::{ChatMessage, MessageRequest, MessageStore, StoreResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new message. Both `chatId` and `senderId` must be present.
    pub async fn insert(&self, request: &MessageRequest) -> DatabaseResult<ChatMessage> {
        let chat_id = request
            .chat_id
            .ok_or_else(|| DatabaseError::ValidationError("chatId is required".to_string()))?;
        let sender_id = request
            .sender_id
            .ok_or_else(|| DatabaseError::ValidationError("senderId is required".to_string()))?;

        let message = ChatMessage::new(chat_id, sender_id, request.content.clone());

        sqlx::query(
            "INSERT INTO messages (id, chat_id, sender_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.sender_id.to_string())
        .bind(&message.content)
        .bind(message.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await?;

        info!(
            message_id = %message.id,
            chat_id = %message.chat_id,
            sender_id = %message.sender_id,
            "message created"
        );
        Ok(message)
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn create(&self, request: &MessageRequest) -> StoreResult<ChatMessage> {
        Ok(self.insert(request).await?)
    }
}
