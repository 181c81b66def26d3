//! Storage collaborators consumed by the relay core.
//!
//! The relay never owns users, chats or messages. It reads through these
//! traits and writes messages through [`MessageStore::create`]. Backends live
//! elsewhere (SQLite in `relay-database`); [`InMemoryStore`] covers tests and
//! local development.

pub mod memory;

use async_trait::async_trait;

use crate::entities::ChatMessage;
use crate::types::{ChatId, Identity, MessageRequest, StoreResult};

pub use memory::InMemoryStore;

/// Lookup of known users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists(&self, identity: Identity) -> StoreResult<bool>;
}

/// Chat membership, read-only from the relay's point of view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn is_member(&self, chat_id: ChatId, identity: Identity) -> StoreResult<bool>;
}

/// Durable message persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist the request and return the stored message. A returned message
    /// has been durably written.
    async fn create(&self, request: &MessageRequest) -> StoreResult<ChatMessage>;
}
