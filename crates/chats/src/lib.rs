//! # Relay Chats Crate
//!
//! Core of the chat relay: it decides who may act on a connection and how an
//! inbound event turns into zero or more outbound deliveries.
//!
//! ## Architecture
//!
//! - **Types**: identifiers, topics, frames, requests and envelopes
//! - **Entities**: persisted messages and live sessions
//! - **Repositories**: store traits the core consumes, plus an in-memory backend
//! - **Services**: identity resolution, the auth gate, the membership guard,
//!   the message router and the topic broker
//! - **Utils**: destination pattern matching
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use relay_chats::{
//!     ChatMembershipGuard, ConnectionAuthGate, ConnectionHandler, IdentityResolver,
//!     InMemoryStore, MessageRouter, TopicBroker,
//! };
//!
//! let store = Arc::new(InMemoryStore::new());
//! let broker = TopicBroker::new();
//! let gate = ConnectionAuthGate::new(IdentityResolver::new(store.clone()));
//! let router = MessageRouter::new(
//!     ChatMembershipGuard::new(store.clone()),
//!     store.clone(),
//!     Arc::new(broker.clone()),
//! );
//! let _handler = ConnectionHandler::new(gate, router, broker);
//! ```

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

pub use entities::{ChatMessage, Session};
pub use repositories::{ChatStore, InMemoryStore, MessageStore, UserStore};
pub use services::{
    Broadcaster, ChatMembershipGuard, ConnectionAuthGate, ConnectionHandler, DeliverySender,
    DropReason, FrameFlow, IdentityResolver, MessageRouter, PublishOutcome, RouteAction,
    TopicBroker,
};
pub use types::{
    ChatId, Command, Delivery, Envelope, Frame, FrameError, Identity, IdentityError,
    MessageRequest, SessionId, StoreError, StoreResult, Topic, TypingRequest,
};
