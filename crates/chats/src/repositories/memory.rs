//! In-memory store backend for tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ChatStore, MessageStore, UserStore};
use crate::entities::ChatMessage;
use crate::types::{ChatId, Identity, MessageRequest, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    users: HashSet<Identity>,
    members: HashMap<ChatId, HashSet<Identity>>,
    messages: Vec<ChatMessage>,
    fail_writes: bool,
    create_calls: usize,
}

/// Users, memberships and messages held in process memory.
///
/// Cloning shares the underlying data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, identity: Identity) {
        self.inner.write().await.users.insert(identity);
    }

    pub async fn add_member(&self, chat_id: ChatId, identity: Identity) {
        let mut inner = self.inner.write().await;
        inner.users.insert(identity);
        inner.members.entry(chat_id).or_default().insert(identity);
    }

    pub async fn remove_member(&self, chat_id: ChatId, identity: Identity) {
        let mut inner = self.inner.write().await;
        if let Some(members) = inner.members.get_mut(&chat_id) {
            members.remove(&identity);
        }
    }

    /// Make every subsequent write fail until switched back.
    pub async fn set_fail_writes(&self, fail: bool) {
        self.inner.write().await.fail_writes = fail;
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner.read().await.messages.clone()
    }

    /// Number of `create` calls, successful or not.
    pub async fn create_calls(&self) -> usize {
        self.inner.read().await.create_calls
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn exists(&self, identity: Identity) -> StoreResult<bool> {
        Ok(self.inner.read().await.users.contains(&identity))
    }
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn is_member(&self, chat_id: ChatId, identity: Identity) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .get(&chat_id)
            .is_some_and(|members| members.contains(&identity)))
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn create(&self, request: &MessageRequest) -> StoreResult<ChatMessage> {
        let mut inner = self.inner.write().await;
        inner.create_calls += 1;

        if inner.fail_writes {
            return Err(StoreError::unavailable("writes are disabled"));
        }

        let chat_id = request
            .chat_id
            .ok_or_else(|| StoreError::invalid("message request has no chat id"))?;
        let sender_id = request
            .sender_id
            .ok_or_else(|| StoreError::invalid("message request has no sender id"))?;

        let message = ChatMessage::new(chat_id, sender_id, request.content.clone());
        inner.messages.push(message.clone());
        Ok(message)
    }
}
