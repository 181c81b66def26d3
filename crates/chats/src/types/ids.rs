//! Identifiers and routing keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::IdentityError;

/// Chats are addressed by UUID.
pub type ChatId = Uuid;

const HYPHENATED_LEN: usize = 36;

/// A verified user identity.
///
/// Only produced by parsing a well-formed token; whether the user actually
/// exists is the identity resolver's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a claimed identity token. Only the 36 character hyphenated form
    /// is accepted; simple, braced and urn spellings are malformed.
    pub fn parse(token: &str) -> Result<Self, IdentityError> {
        if token.len() != HYPHENATED_LEN {
            return Err(IdentityError::Malformed(token.to_string()));
        }
        Uuid::parse_str(token)
            .map(Self)
            .map_err(|_| IdentityError::Malformed(token.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for Identity {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Routing key grouping every session subscribed to one stream of updates.
///
/// ```
/// use relay_chats::Topic;
/// use uuid::Uuid;
///
/// let chat_id = Uuid::nil();
/// let topic = Topic::chat(chat_id);
/// assert_eq!(topic.as_str(), "topic/chat/00000000-0000-0000-0000-000000000000");
/// assert_eq!(Topic::new("/topic/chat/00000000-0000-0000-0000-000000000000"), topic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub const CHAT_PREFIX: &'static str = "topic/chat/";

    /// Topic carrying the broadcasts of one chat.
    pub fn chat(chat_id: ChatId) -> Self {
        Self(format!("{}{}", Self::CHAT_PREFIX, chat_id))
    }

    /// Topic from a subscription destination. Leading slashes are ignored.
    pub fn new(destination: &str) -> Self {
        Self(destination.trim_start_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
