//! Integration tests for the relay core, driven frame by frame.

use std::sync::Arc;

use relay_chats::{
    ChatMembershipGuard, Command, ConnectionAuthGate, ConnectionHandler, Delivery, Envelope,
    Frame, FrameFlow, Identity, IdentityResolver, InMemoryStore, MessageRouter, Session,
    Topic, TopicBroker,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

struct Relay {
    store: InMemoryStore,
    handler: ConnectionHandler,
}

impl Relay {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        let broker = TopicBroker::new();

        let gate = ConnectionAuthGate::new(IdentityResolver::new(shared.clone()));
        let router = MessageRouter::new(
            ChatMembershipGuard::new(shared.clone()),
            shared,
            Arc::new(broker.clone()),
        )
        .with_app_prefix("app");

        Self {
            store,
            handler: ConnectionHandler::new(gate, router, broker),
        }
    }

    fn broker(&self) -> &TopicBroker {
        self.handler.broker()
    }
}

struct Client {
    session: Session,
    outbound: mpsc::Sender<Arc<Delivery>>,
    inbox: mpsc::Receiver<Arc<Delivery>>,
}

impl Client {
    fn new() -> Self {
        Self::with_capacity(16)
    }

    fn with_capacity(capacity: usize) -> Self {
        let (outbound, inbox) = mpsc::channel(capacity);
        Self {
            session: Session::new(),
            outbound,
            inbox,
        }
    }

    async fn frame(&self, relay: &Relay, frame: Frame) -> FrameFlow {
        relay.handler.handle(&self.session, &self.outbound, frame).await
    }

    async fn connect(&self, relay: &Relay, user_id: &str) {
        self.frame(relay, Frame::new(Command::Connect).with_header("userId", user_id))
            .await;
    }

    async fn subscribe(&self, relay: &Relay, chat_id: Uuid) {
        let frame = Frame::new(Command::Subscribe)
            .with_header("destination", format!("/topic/chat/{chat_id}"));
        self.frame(relay, frame).await;
    }

    async fn send(&self, relay: &Relay, chat_id: Uuid, body: Value) {
        let frame = Frame::new(Command::Send)
            .with_header("destination", format!("/app/chat/{chat_id}/send"))
            .with_body(body);
        self.frame(relay, frame).await;
    }

    fn drain(&mut self) -> Vec<Arc<Delivery>> {
        let mut received = Vec::new();
        while let Ok(delivery) = self.inbox.try_recv() {
            received.push(delivery);
        }
        received
    }
}

#[tokio::test]
async fn malformed_identity_cannot_publish() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();
    let watcher_id = Identity::new(Uuid::new_v4());
    relay.store.add_member(chat, watcher_id).await;

    let mut watcher = Client::new();
    watcher.subscribe(&relay, chat).await;

    let intruder = Client::new();
    intruder.connect(&relay, "not-a-uuid").await;
    assert!(!intruder.session.is_authenticated());

    intruder
        .send(&relay, chat, json!({ "chatId": chat, "content": "hello" }))
        .await;

    assert!(watcher.drain().is_empty());
    assert!(relay.store.messages().await.is_empty());
    assert_eq!(relay.store.create_calls().await, 0);
}

#[tokio::test]
async fn member_message_reaches_only_its_chat_subscribers() {
    let relay = Relay::new();
    let c1 = Uuid::new_v4();
    let c2 = Uuid::new_v4();
    let sender = Identity::new(Uuid::new_v4());
    relay.store.add_member(c1, sender).await;

    let mut first = Client::new();
    let mut second = Client::new();
    let mut elsewhere = Client::new();
    first.subscribe(&relay, c1).await;
    second.subscribe(&relay, c1).await;
    elsewhere.subscribe(&relay, c2).await;

    let author = Client::new();
    author.connect(&relay, &sender.to_string()).await;
    assert_eq!(author.session.identity(), Some(sender));
    author
        .send(&relay, c1, json!({ "senderId": sender, "chatId": c1, "content": "hi all" }))
        .await;

    let stored = relay.store.messages().await;
    assert_eq!(stored.len(), 1);
    let m1 = stored[0].clone();

    for client in [&mut first, &mut second] {
        let received = client.drain();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].topic, Topic::chat(c1));
        assert_eq!(received[0].envelope, Envelope::NewMessage(m1.clone()));
    }
    assert!(elsewhere.drain().is_empty());
}

#[tokio::test]
async fn failed_persistence_produces_no_broadcast() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();
    let sender = Identity::new(Uuid::new_v4());
    relay.store.add_member(chat, sender).await;
    relay.store.set_fail_writes(true).await;

    let mut watcher = Client::new();
    watcher.subscribe(&relay, chat).await;

    let author = Client::new();
    author
        .send(&relay, chat, json!({ "senderId": sender, "content": "lost" }))
        .await;

    assert_eq!(relay.store.create_calls().await, 1);
    assert!(watcher.drain().is_empty());
}

#[tokio::test]
async fn typing_is_broadcast_without_persistence() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();

    let mut watcher = Client::new();
    watcher.subscribe(&relay, chat).await;

    let anonymous = Client::new();
    let frame = Frame::new(Command::Send)
        .with_header("destination", format!("chat/{chat}/typing"))
        .with_body(json!({ "userId": Uuid::new_v4(), "chatId": chat, "isTyping": true }));
    anonymous.frame(&relay, frame).await;

    let received = watcher.drain();
    assert_eq!(received.len(), 1);
    assert!(matches!(
        &received[0].envelope,
        Envelope::UserTyping(request) if request.is_typing
    ));
    assert_eq!(relay.store.create_calls().await, 0);
}

#[tokio::test]
async fn rebroadcast_delivers_the_same_envelope_as_realtime_publish() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();
    let sender = Identity::new(Uuid::new_v4());
    relay.store.add_member(chat, sender).await;

    let mut watcher = Client::new();
    watcher.subscribe(&relay, chat).await;

    let author = Client::new();
    author
        .send(&relay, chat, json!({ "senderId": sender, "content": "twice" }))
        .await;
    let message = relay.store.messages().await.remove(0);
    relay.handler.router().rebroadcast(&message).await;

    let received = watcher.drain();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].envelope, received[1].envelope);
    assert_eq!(received[0].topic, received[1].topic);
}

#[tokio::test]
async fn disconnecting_subscriber_does_not_affect_the_other() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();
    let sender = Identity::new(Uuid::new_v4());
    relay.store.add_member(chat, sender).await;

    let mut staying = Client::new();
    let leaving = Client::new();
    staying.subscribe(&relay, chat).await;
    leaving.subscribe(&relay, chat).await;
    assert_eq!(relay.broker().subscriber_count(&Topic::chat(chat)).await, 2);

    // The leaving client's queue is gone before the broadcast reaches it.
    let Client { session: leaving_session, inbox, .. } = leaving;
    drop(inbox);

    let author = Client::new();
    tokio::join!(
        author.send(&relay, chat, json!({ "senderId": sender, "content": "still here" })),
        relay.handler.close(&leaving_session),
    );

    assert_eq!(staying.drain().len(), 1);
    assert_eq!(relay.broker().subscriber_count(&Topic::chat(chat)).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribers_closing_during_a_publish_burst_do_not_disturb_delivery() {
    const BURST: usize = 40;

    let relay = Arc::new(Relay::new());
    let chat = Uuid::new_v4();
    let sender = Identity::new(Uuid::new_v4());
    relay.store.add_member(chat, sender).await;

    let mut staying = Client::with_capacity(BURST);
    staying.subscribe(&relay, chat).await;

    let mut leaving = Vec::new();
    for _ in 0..8 {
        let client = Client::with_capacity(BURST);
        client.subscribe(&relay, chat).await;
        leaving.push(client);
    }
    assert_eq!(relay.broker().subscriber_count(&Topic::chat(chat)).await, 9);

    let publisher = {
        let relay = relay.clone();
        tokio::spawn(async move {
            let author = Client::new();
            for n in 0..BURST {
                author
                    .send(&relay, chat, json!({ "senderId": sender, "content": format!("m{n}") }))
                    .await;
                tokio::task::yield_now().await;
            }
        })
    };

    let closers: Vec<_> = leaving
        .into_iter()
        .map(|client| {
            let relay = relay.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                relay.handler.close(&client.session).await;
                client
            })
        })
        .collect();

    publisher.await.expect("publisher task");
    for closer in closers {
        let mut client = closer.await.expect("closer task");
        assert!(client.drain().len() <= BURST);
    }

    let contents: Vec<String> = staying
        .drain()
        .iter()
        .map(|delivery| match &delivery.envelope {
            Envelope::NewMessage(message) => message.content.clone(),
            other => panic!("unexpected envelope {other:?}"),
        })
        .collect();
    let expected: Vec<String> = (0..BURST).map(|n| format!("m{n}")).collect();
    assert_eq!(contents, expected);
    assert_eq!(relay.store.messages().await.len(), BURST);
    assert_eq!(relay.broker().subscriber_count(&Topic::chat(chat)).await, 1);
}

#[tokio::test]
async fn revoked_membership_stops_the_next_publish() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();
    let sender = Identity::new(Uuid::new_v4());
    relay.store.add_member(chat, sender).await;

    let mut watcher = Client::new();
    watcher.subscribe(&relay, chat).await;

    let author = Client::new();
    author
        .send(&relay, chat, json!({ "senderId": sender, "content": "before" }))
        .await;
    relay.store.remove_member(chat, sender).await;
    author
        .send(&relay, chat, json!({ "senderId": sender, "content": "after" }))
        .await;

    assert_eq!(watcher.drain().len(), 1);
    assert_eq!(relay.store.create_calls().await, 1);
}

#[tokio::test]
async fn disconnect_frame_closes_and_drops_subscriptions() {
    let relay = Relay::new();
    let chat = Uuid::new_v4();
    let client = Client::new();
    client.subscribe(&relay, chat).await;

    let flow = client.frame(&relay, Frame::new(Command::Disconnect)).await;
    assert_eq!(flow, FrameFlow::Close);

    relay.handler.close(&client.session).await;
    assert_eq!(relay.broker().subscriber_count(&Topic::chat(chat)).await, 0);
}

#[tokio::test]
async fn first_successful_binding_is_kept() {
    let relay = Relay::new();
    let first = Identity::new(Uuid::new_v4());
    let second = Identity::new(Uuid::new_v4());
    relay.store.add_user(first).await;
    relay.store.add_user(second).await;

    let client = Client::new();
    client.connect(&relay, &first.to_string()).await;
    client.connect(&relay, &second.to_string()).await;

    assert_eq!(client.session.identity(), Some(first));
}
