//! Repository for chats and their members.

use async_trait::async_trait;
use relay_chats::{ChatId, ChatStore, Identity, StoreResult};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an empty chat and return its id
    pub async fn create_chat(&self, name: &str) -> DatabaseResult<ChatId> {
        let chat_id = Uuid::new_v4();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO chats (id, name, created_at) VALUES (?, ?, ?)")
            .bind(chat_id.to_string())
            .bind(name)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        info!(chat_id = %chat_id, name, "chat created");
        Ok(chat_id)
    }

    /// Add a member to a chat. Adding an existing member is a no-op.
    pub async fn add_member(&self, chat_id: ChatId, user_id: Identity) -> DatabaseResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT OR IGNORE INTO chat_members (chat_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(chat_id.to_string())
        .bind(user_id.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(chat_id = %chat_id, user_id = %user_id, "member added");
        }
        Ok(())
    }

    pub async fn find_membership(&self, chat_id: ChatId, user_id: Identity) -> DatabaseResult<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM chat_members WHERE chat_id = ? AND user_id = ?")
                .bind(chat_id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }
}

#[async_trait]
impl ChatStore for MemberRepository {
    async fn is_member(&self, chat_id: ChatId, identity: Identity) -> StoreResult<bool> {
        Ok(self.find_membership(chat_id, identity).await?)
    }
}
