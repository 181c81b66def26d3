//! Topic broker fanning envelopes out to subscribed sessions.
//!
//! Each session registers a bounded queue per topic. Publishing snapshots the
//! subscriber set under a read lock and then offers the delivery to every
//! queue without waiting, so a slow or vanished subscriber never holds up the
//! others.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::types::{Delivery, Envelope, SessionId, Topic};

/// Sending half of a session's outbound queue.
pub type DeliverySender = mpsc::Sender<Arc<Delivery>>;

/// Publishes envelopes to everyone subscribed to a topic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Returns how many subscribers accepted the delivery.
    async fn publish(&self, topic: &Topic, envelope: Envelope) -> usize;
}

type Subscribers = HashMap<SessionId, DeliverySender>;

/// In-process subscriber registry keyed by topic.
#[derive(Debug, Clone, Default)]
pub struct TopicBroker {
    topics: Arc<RwLock<HashMap<Topic, Subscribers>>>,
}

impl TopicBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sender` for `topic`. Subscribing twice replaces the queue.
    pub async fn subscribe(&self, topic: Topic, session_id: SessionId, sender: DeliverySender) {
        debug!(%topic, %session_id, "session subscribed");
        let mut topics = self.topics.write().await;
        topics.entry(topic).or_default().insert(session_id, sender);
    }

    pub async fn unsubscribe(&self, topic: &Topic, session_id: SessionId) -> bool {
        let mut topics = self.topics.write().await;
        let Some(subscribers) = topics.get_mut(topic) else {
            return false;
        };

        let removed = subscribers.remove(&session_id).is_some();
        if subscribers.is_empty() {
            topics.remove(topic);
        }
        if removed {
            debug!(%topic, %session_id, "session unsubscribed");
        }
        removed
    }

    /// Drop every subscription held by a session. Returns how many were removed.
    pub async fn disconnect(&self, session_id: SessionId) -> usize {
        let mut topics = self.topics.write().await;
        let mut removed = 0;
        topics.retain(|_, subscribers| {
            if subscribers.remove(&session_id).is_some() {
                removed += 1;
            }
            !subscribers.is_empty()
        });
        debug!(%session_id, removed, "session subscriptions dropped");
        removed
    }

    pub async fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl Broadcaster for TopicBroker {
    async fn publish(&self, topic: &Topic, envelope: Envelope) -> usize {
        let snapshot: Vec<(SessionId, DeliverySender)> = {
            let topics = self.topics.read().await;
            match topics.get(topic) {
                Some(subscribers) => subscribers
                    .iter()
                    .map(|(session_id, sender)| (*session_id, sender.clone()))
                    .collect(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            debug!(%topic, "no subscribers for topic");
            return 0;
        }

        let delivery = Arc::new(Delivery::new(topic.clone(), envelope));
        let mut delivered = 0;
        for (session_id, sender) in snapshot {
            match sender.try_send(Arc::clone(&delivery)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%topic, %session_id, "subscriber queue full, delivery skipped")
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(%topic, %session_id, "subscriber gone, delivery skipped")
                }
            }
        }
        delivered
    }
}
