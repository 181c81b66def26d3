//! Routing of chat-scoped frames to publish operations.
//!
//! Destinations are matched against an ordered table of patterns. Message
//! events go through the membership guard and the message store before they
//! are broadcast; typing events are broadcast straight away. Every failure is
//! a silent drop: the outcome is logged and returned to the caller, never
//! sent back to the client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::broker::Broadcaster;
use super::membership_guard::ChatMembershipGuard;
use crate::entities::ChatMessage;
use crate::repositories::MessageStore;
use crate::types::{ChatId, Envelope, MessageRequest, Topic, TypingRequest};
use crate::utils::{DestinationPattern, PathVariables};

/// Destination of chat message publishes.
pub const SEND_DESTINATION: &str = "chat/{chatId}/send";
/// Destination of typing notifications.
pub const TYPING_DESTINATION: &str = "chat/{chatId}/typing";

const CHAT_ID_VARIABLE: &str = "chatId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    PublishMessage,
    PublishTyping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownDestination,
    InvalidChatId,
    MalformedPayload,
    NotAMember,
    PersistenceFailure,
}

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Delivered { recipients: usize },
    Dropped(DropReason),
}

pub struct MessageRouter {
    guard: ChatMembershipGuard,
    messages: Arc<dyn MessageStore>,
    broadcaster: Arc<dyn Broadcaster>,
    routes: Vec<(DestinationPattern, RouteAction)>,
    app_prefix: Option<String>,
}

impl MessageRouter {
    pub fn new(
        guard: ChatMembershipGuard,
        messages: Arc<dyn MessageStore>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let routes = vec![
            (DestinationPattern::parse(SEND_DESTINATION), RouteAction::PublishMessage),
            (DestinationPattern::parse(TYPING_DESTINATION), RouteAction::PublishTyping),
        ];

        Self {
            guard,
            messages,
            broadcaster,
            routes,
            app_prefix: None,
        }
    }

    /// Strip an application prefix (such as `app`) from destinations before
    /// matching, so `/app/chat/{id}/send` routes like `chat/{id}/send`.
    pub fn with_app_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        self.app_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Registered `(pattern, action)` pairs in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, RouteAction)> {
        self.routes
            .iter()
            .map(|(pattern, action)| (pattern.as_str(), *action))
    }

    /// Match a destination against the table; the first matching pattern wins.
    pub fn route(&self, destination: &str) -> Option<(RouteAction, PathVariables)> {
        let destination = self.strip_app_prefix(destination);
        self.routes.iter().find_map(|(pattern, action)| {
            pattern.matches(destination).map(|variables| (*action, variables))
        })
    }

    /// Route a `SEND` frame's destination and body to the matching operation.
    pub async fn dispatch(&self, destination: &str, body: Option<&Value>) -> PublishOutcome {
        let Some((action, variables)) = self.route(destination) else {
            debug!(destination, "no route for destination");
            return PublishOutcome::Dropped(DropReason::UnknownDestination);
        };

        let Some(chat_id) = variables
            .get(CHAT_ID_VARIABLE)
            .and_then(|raw| Uuid::parse_str(raw).ok())
        else {
            debug!(destination, "destination carries an invalid chat id");
            return PublishOutcome::Dropped(DropReason::InvalidChatId);
        };

        match action {
            RouteAction::PublishMessage => match decode::<MessageRequest>(destination, body) {
                Some(request) => self.publish_message(chat_id, request).await,
                None => PublishOutcome::Dropped(DropReason::MalformedPayload),
            },
            RouteAction::PublishTyping => match decode::<TypingRequest>(destination, body) {
                Some(request) => self.publish_typing(chat_id, request).await,
                None => PublishOutcome::Dropped(DropReason::MalformedPayload),
            },
        }
    }

    /// Authorize, persist and broadcast a chat message.
    ///
    /// The sender is taken from the payload. The destination's chat id is
    /// authoritative and overrides any `chatId` in the payload.
    pub async fn publish_message(&self, chat_id: ChatId, mut request: MessageRequest) -> PublishOutcome {
        info!(%chat_id, sender_id = ?request.sender_id, "chat message received");

        if !self.guard.authorize(chat_id, request.sender_id).await {
            debug!(%chat_id, "chat message dropped, sender not authorized");
            return PublishOutcome::Dropped(DropReason::NotAMember);
        }

        request.chat_id = Some(chat_id);
        let message = match self.messages.create(&request).await {
            Ok(message) => message,
            Err(error) => {
                warn!(%chat_id, %error, "chat message dropped, persistence failed");
                return PublishOutcome::Dropped(DropReason::PersistenceFailure);
            }
        };

        debug!(%chat_id, message_id = %message.id, "chat message persisted");
        self.broadcast(Topic::chat(chat_id), Envelope::NewMessage(message))
            .await
    }

    /// Fan out an already persisted message, e.g. one created over HTTP.
    pub async fn rebroadcast(&self, message: &ChatMessage) -> PublishOutcome {
        debug!(chat_id = %message.chat_id, message_id = %message.id, "rebroadcasting message");
        self.broadcast(
            Topic::chat(message.chat_id),
            Envelope::NewMessage(message.clone()),
        )
        .await
    }

    /// Broadcast a typing notification. No authorization, no persistence.
    pub async fn publish_typing(&self, chat_id: ChatId, request: TypingRequest) -> PublishOutcome {
        debug!(%chat_id, user_id = ?request.user_id, is_typing = request.is_typing, "typing status");
        self.broadcast(Topic::chat(chat_id), Envelope::UserTyping(request))
            .await
    }

    async fn broadcast(&self, topic: Topic, envelope: Envelope) -> PublishOutcome {
        let kind = envelope.kind();
        let recipients = self.broadcaster.publish(&topic, envelope).await;
        debug!(%topic, kind, recipients, "envelope broadcast");
        PublishOutcome::Delivered { recipients }
    }

    fn strip_app_prefix<'a>(&self, destination: &'a str) -> &'a str {
        let trimmed = destination.trim_start_matches('/');
        match &self.app_prefix {
            Some(prefix) => trimmed
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(trimmed),
            None => trimmed,
        }
    }
}

fn decode<T: DeserializeOwned>(destination: &str, body: Option<&Value>) -> Option<T> {
    let body = body.cloned().unwrap_or(Value::Null);
    match serde_json::from_value(body) {
        Ok(request) => Some(request),
        Err(error) => {
            debug!(destination, %error, "payload could not be decoded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockChatStore, MockMessageStore};
    use crate::services::broker::MockBroadcaster;
    use crate::types::{Identity, StoreError};
    use serde_json::json;
    use std::sync::Mutex;

    struct Harness {
        chats: MockChatStore,
        messages: MockMessageStore,
        broadcaster: MockBroadcaster,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                chats: MockChatStore::new(),
                messages: MockMessageStore::new(),
                broadcaster: MockBroadcaster::new(),
            }
        }

        fn member(mut self, is_member: bool) -> Self {
            self.chats
                .expect_is_member()
                .returning(move |_, _| Ok(is_member));
            self
        }

        fn build(self) -> MessageRouter {
            MessageRouter::new(
                ChatMembershipGuard::new(Arc::new(self.chats)),
                Arc::new(self.messages),
                Arc::new(self.broadcaster),
            )
        }
    }

    fn request(chat_id: ChatId) -> MessageRequest {
        MessageRequest::new(chat_id, Identity::new(Uuid::new_v4()), "hello")
    }

    fn persisted(request: &MessageRequest) -> ChatMessage {
        ChatMessage::new(
            request.chat_id.unwrap(),
            request.sender_id.unwrap(),
            request.content.clone(),
        )
    }

    #[tokio::test]
    async fn non_member_publish_touches_neither_store_nor_broadcaster() {
        let mut harness = Harness::new().member(false);
        harness.messages.expect_create().times(0);
        harness.broadcaster.expect_publish().times(0);

        let outcome = harness
            .build()
            .publish_message(Uuid::new_v4(), request(Uuid::new_v4()))
            .await;
        assert_eq!(outcome, PublishOutcome::Dropped(DropReason::NotAMember));
    }

    #[tokio::test]
    async fn anonymous_sender_is_dropped() {
        let mut harness = Harness::new();
        harness.chats.expect_is_member().times(0);
        harness.messages.expect_create().times(0);
        harness.broadcaster.expect_publish().times(0);

        let chat_id = Uuid::new_v4();
        let mut anonymous = request(chat_id);
        anonymous.sender_id = None;

        let outcome = harness.build().publish_message(chat_id, anonymous).await;
        assert_eq!(outcome, PublishOutcome::Dropped(DropReason::NotAMember));
    }

    #[tokio::test]
    async fn persistence_failure_suppresses_broadcast() {
        let mut harness = Harness::new().member(true);
        harness
            .messages
            .expect_create()
            .times(1)
            .returning(|_| Err(StoreError::database("disk full")));
        harness.broadcaster.expect_publish().times(0);

        let chat_id = Uuid::new_v4();
        let outcome = harness.build().publish_message(chat_id, request(chat_id)).await;
        assert_eq!(outcome, PublishOutcome::Dropped(DropReason::PersistenceFailure));
    }

    #[tokio::test]
    async fn successful_persist_broadcasts_exactly_once() {
        let chat_id = Uuid::new_v4();
        let stored = Arc::new(Mutex::new(None::<ChatMessage>));
        let broadcast = Arc::new(Mutex::new(None::<(Topic, Envelope)>));

        let mut harness = Harness::new().member(true);
        let stored_in = Arc::clone(&stored);
        harness.messages.expect_create().times(1).returning(move |request| {
            let message = persisted(request);
            *stored_in.lock().unwrap() = Some(message.clone());
            Ok(message)
        });
        let broadcast_in = Arc::clone(&broadcast);
        harness
            .broadcaster
            .expect_publish()
            .times(1)
            .returning(move |topic, envelope| {
                *broadcast_in.lock().unwrap() = Some((topic.clone(), envelope));
                3
            });

        let outcome = harness.build().publish_message(chat_id, request(chat_id)).await;
        assert_eq!(outcome, PublishOutcome::Delivered { recipients: 3 });

        let message = stored.lock().unwrap().clone().unwrap();
        let (topic, envelope) = broadcast.lock().unwrap().clone().unwrap();
        assert_eq!(topic, Topic::chat(chat_id));
        assert_eq!(envelope, Envelope::NewMessage(message));
    }

    #[tokio::test]
    async fn destination_chat_id_overrides_payload_chat_id() {
        let destination_chat = Uuid::new_v4();
        let mut harness = Harness::new().member(true);
        harness
            .messages
            .expect_create()
            .withf(move |request| request.chat_id == Some(destination_chat))
            .times(1)
            .returning(|request| Ok(persisted(request)));
        harness
            .broadcaster
            .expect_publish()
            .withf(move |topic, _| *topic == Topic::chat(destination_chat))
            .times(1)
            .returning(|_, _| 1);

        let outcome = harness
            .build()
            .publish_message(destination_chat, request(Uuid::new_v4()))
            .await;
        assert_eq!(outcome, PublishOutcome::Delivered { recipients: 1 });
    }

    #[tokio::test]
    async fn typing_never_persists_even_for_non_members() {
        let mut harness = Harness::new();
        harness.chats.expect_is_member().times(0);
        harness.messages.expect_create().times(0);
        harness
            .broadcaster
            .expect_publish()
            .withf(|_, envelope| matches!(envelope, Envelope::UserTyping(_)))
            .times(1)
            .returning(|_, _| 0);

        let router = harness.build();
        let outcome = router
            .dispatch(
                &format!("chat/{}/typing", Uuid::new_v4()),
                Some(&json!({ "userId": Uuid::new_v4(), "isTyping": true })),
            )
            .await;
        assert_eq!(outcome, PublishOutcome::Delivered { recipients: 0 });
    }

    #[tokio::test]
    async fn rebroadcast_matches_realtime_envelope() {
        let chat_id = Uuid::new_v4();
        let envelopes = Arc::new(Mutex::new(Vec::<(Topic, Envelope)>::new()));
        let message = ChatMessage::new(chat_id, Identity::new(Uuid::new_v4()), "hi");

        let mut harness = Harness::new().member(true);
        let reply = message.clone();
        harness
            .messages
            .expect_create()
            .returning(move |_| Ok(reply.clone()));
        let sink = Arc::clone(&envelopes);
        harness
            .broadcaster
            .expect_publish()
            .times(2)
            .returning(move |topic, envelope| {
                sink.lock().unwrap().push((topic.clone(), envelope));
                1
            });

        let router = harness.build();
        router.publish_message(chat_id, request(chat_id)).await;
        router.rebroadcast(&message).await;

        let envelopes = envelopes.lock().unwrap();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0], envelopes[1]);
    }

    #[tokio::test]
    async fn unroutable_frames_are_dropped() {
        let mut harness = Harness::new();
        harness.messages.expect_create().times(0);
        harness.broadcaster.expect_publish().times(0);
        let router = harness.build();

        assert_eq!(
            router.dispatch("chat/123/delete", None).await,
            PublishOutcome::Dropped(DropReason::UnknownDestination)
        );
        assert_eq!(
            router.dispatch("chat/not-a-uuid/send", None).await,
            PublishOutcome::Dropped(DropReason::InvalidChatId)
        );
        assert_eq!(
            router
                .dispatch(&format!("chat/{}/send", Uuid::new_v4()), Some(&json!([1, 2])))
                .await,
            PublishOutcome::Dropped(DropReason::MalformedPayload)
        );
    }

    #[test]
    fn app_prefix_is_stripped_before_matching() {
        let router = Harness::new().build().with_app_prefix("/app");
        let chat_id = Uuid::new_v4();

        let (action, variables) = router.route(&format!("/app/chat/{chat_id}/send")).unwrap();
        assert_eq!(action, RouteAction::PublishMessage);
        assert_eq!(variables.get("chatId"), Some(chat_id.to_string().as_str()));
        assert!(router.route(&format!("chat/{chat_id}/typing")).is_some());
        assert!(router.route(&format!("/application/chat/{chat_id}/send")).is_none());
    }

    #[test]
    fn routes_are_listed_in_match_order() {
        let router = Harness::new().build();
        let routes: Vec<_> = router.routes().collect();
        assert_eq!(
            routes,
            vec![
                (SEND_DESTINATION, RouteAction::PublishMessage),
                (TYPING_DESTINATION, RouteAction::PublishTyping),
            ]
        );
    }
}
