//! Transport-agnostic frames.
//!
//! Inbound frames are JSON objects with a `command`, string `headers` and an
//! optional JSON `body`. Outbound deliveries are `MESSAGE` frames carrying an
//! [`Envelope`] for one topic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::FrameError;
use super::events::Envelope;
use super::ids::Topic;

/// Header carrying a client's identity claim.
pub const USER_ID_HEADER: &str = "userId";
/// Header naming where a frame is addressed.
pub const DESTINATION_HEADER: &str = "destination";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Connect,
    Subscribe,
    Unsubscribe,
    Send,
    Disconnect,
}

/// One inbound client frame.
///
/// ```
/// use relay_chats::{Command, Frame};
///
/// let frame = Frame::decode(
///     r#"{"command":"SEND","headers":{"destination":"chat/1/send"},"body":{"content":"hi"}}"#,
/// )
/// .unwrap();
/// assert_eq!(frame.command, Command::Send);
/// assert_eq!(frame.destination().unwrap(), "chat/1/send");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub command: Command,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn destination(&self) -> Result<&str, FrameError> {
        self.header(DESTINATION_HEADER)
            .ok_or(FrameError::MissingHeader(DESTINATION_HEADER))
    }

    pub fn decode(text: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// An envelope on its way to one topic's subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub topic: Topic,
    pub envelope: Envelope,
}

#[derive(Serialize)]
struct OutboundFrame<'a> {
    command: &'static str,
    destination: &'a str,
    body: &'a Envelope,
}

impl Delivery {
    pub fn new(topic: Topic, envelope: Envelope) -> Self {
        Self { topic, envelope }
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        let frame = OutboundFrame {
            command: "MESSAGE",
            destination: self.topic.as_str(),
            body: &self.envelope,
        };
        Ok(serde_json::to_string(&frame)?)
    }
}
