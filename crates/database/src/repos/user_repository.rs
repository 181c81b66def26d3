//! Repository for user data access operations.

use async_trait::async_trait;
use relay_chats::{Identity, StoreResult, UserStore};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with a freshly generated identity
    pub async fn create_user(&self, display_name: &str) -> DatabaseResult<Identity> {
        let identity = Identity::new(Uuid::new_v4());
        self.insert(identity, display_name).await?;
        Ok(identity)
    }

    /// Insert a user under a known identity
    pub async fn insert(&self, identity: Identity, display_name: &str) -> DatabaseResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES (?, ?, ?)")
            .bind(identity.to_string())
            .bind(display_name)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        info!(user_id = %identity, display_name, "user created");
        Ok(())
    }

    pub async fn find_exists(&self, identity: Identity) -> DatabaseResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE id = ?")
            .bind(identity.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn exists(&self, identity: Identity) -> StoreResult<bool> {
        Ok(self.find_exists(identity).await?)
    }
}
