//! Shared application state for the gateway

use std::sync::Arc;

use relay_chats::{
    ChatMembershipGuard, ChatStore, ConnectionAuthGate, ConnectionHandler, IdentityResolver,
    MessageRouter, MessageStore, TopicBroker, UserStore,
};
use relay_config::RelayConfig;

/// Shared state handed to every request and socket.
#[derive(Clone)]
pub struct GatewayState {
    /// Per-frame handling for live connections
    pub handler: Arc<ConnectionHandler>,
    /// Membership checks for the HTTP publish path
    pub guard: ChatMembershipGuard,
    /// Message persistence for the HTTP publish path
    pub messages: Arc<dyn MessageStore>,
    /// Capacity of each connection's outbound queue
    pub subscriber_buffer: usize,
}

impl GatewayState {
    /// Wire the relay core around the given stores.
    pub fn new(
        users: Arc<dyn UserStore>,
        chats: Arc<dyn ChatStore>,
        messages: Arc<dyn MessageStore>,
        relay: &RelayConfig,
    ) -> Self {
        let broker = TopicBroker::new();
        let guard = ChatMembershipGuard::new(chats);

        let gate = ConnectionAuthGate::new(IdentityResolver::new(users));
        let router = MessageRouter::new(guard.clone(), messages.clone(), Arc::new(broker.clone()))
            .with_app_prefix(relay.app_prefix.clone());

        Self {
            handler: Arc::new(ConnectionHandler::new(gate, router, broker)),
            guard,
            messages,
            subscriber_buffer: relay.subscriber_buffer.max(1),
        }
    }

    pub fn broker(&self) -> &TopicBroker {
        self.handler.broker()
    }
}
