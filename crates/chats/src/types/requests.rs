//! Inbound payloads carried by `SEND` frames.

use serde::{Deserialize, Serialize};

use super::ids::{ChatId, Identity};

/// Payload of `chat/{chatId}/send`.
///
/// The sender names itself in `senderId`; the router trusts that claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub sender_id: Option<Identity>,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    pub content: String,
}

impl MessageRequest {
    pub fn new(chat_id: ChatId, sender_id: Identity, content: impl Into<String>) -> Self {
        Self {
            sender_id: Some(sender_id),
            chat_id: Some(chat_id),
            content: content.into(),
        }
    }
}

/// Payload of `chat/{chatId}/typing`, echoed verbatim inside `USER_TYPING`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRequest {
    #[serde(default)]
    pub user_id: Option<Identity>,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    #[serde(default, alias = "typing")]
    pub is_typing: bool,
}
