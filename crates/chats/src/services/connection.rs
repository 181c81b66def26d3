//! Per-frame handling for one live connection.
//!
//! The transport decodes frames and hands them here together with the
//! connection's [`Session`] and outbound queue. Nothing is ever written back
//! in response to a frame; clients only observe broadcasts.

use tracing::{debug, info};

use super::auth_gate::ConnectionAuthGate;
use super::broker::{DeliverySender, TopicBroker};
use super::message_router::MessageRouter;
use crate::entities::Session;
use crate::types::{Command, Frame, Topic};

/// Whether the connection should keep reading frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFlow {
    Continue,
    Close,
}

pub struct ConnectionHandler {
    gate: ConnectionAuthGate,
    router: MessageRouter,
    broker: TopicBroker,
}

impl ConnectionHandler {
    pub fn new(gate: ConnectionAuthGate, router: MessageRouter, broker: TopicBroker) -> Self {
        Self {
            gate,
            router,
            broker,
        }
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn broker(&self) -> &TopicBroker {
        &self.broker
    }

    pub async fn handle(&self, session: &Session, outbound: &DeliverySender, frame: Frame) -> FrameFlow {
        let frame = self.gate.intercept(frame, session).await;

        match frame.command {
            Command::Connect => {
                debug!(session_id = %session.id(), authenticated = session.is_authenticated(), "connect frame");
            }
            Command::Subscribe => match frame.destination() {
                Ok(destination) => {
                    self.broker
                        .subscribe(Topic::new(destination), session.id(), outbound.clone())
                        .await;
                }
                Err(error) => debug!(session_id = %session.id(), %error, "subscribe ignored"),
            },
            Command::Unsubscribe => match frame.destination() {
                Ok(destination) => {
                    self.broker
                        .unsubscribe(&Topic::new(destination), session.id())
                        .await;
                }
                Err(error) => debug!(session_id = %session.id(), %error, "unsubscribe ignored"),
            },
            Command::Send => match frame.destination() {
                Ok(destination) => {
                    let outcome = self.router.dispatch(destination, frame.body.as_ref()).await;
                    debug!(session_id = %session.id(), destination, ?outcome, "send frame handled");
                }
                Err(error) => debug!(session_id = %session.id(), %error, "send ignored"),
            },
            Command::Disconnect => return FrameFlow::Close,
        }

        FrameFlow::Continue
    }

    /// Tear down a connection. Its subscriptions go with it.
    pub async fn close(&self, session: &Session) {
        let removed = self.broker.disconnect(session.id()).await;
        info!(session_id = %session.id(), subscriptions = removed, "connection closed");
    }
}
