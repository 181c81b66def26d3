//! Broadcast envelopes.

use serde::{Deserialize, Serialize};

use super::requests::TypingRequest;
use crate::entities::ChatMessage;

/// Tagged payload delivered to topic subscribers.
///
/// Serialized as `{"type": "NEW_MESSAGE" | "USER_TYPING", "data": ...}`.
/// Envelopes live only for the duration of a broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Envelope {
    #[serde(rename = "NEW_MESSAGE")]
    NewMessage(ChatMessage),
    #[serde(rename = "USER_TYPING")]
    UserTyping(TypingRequest),
}

impl Envelope {
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::NewMessage(_) => "NEW_MESSAGE",
            Envelope::UserTyping(_) => "USER_TYPING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identity;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn envelope_uses_type_and_data_fields() {
        let user = Identity::new(Uuid::new_v4());
        let envelope = Envelope::UserTyping(TypingRequest {
            user_id: Some(user),
            chat_id: None,
            is_typing: true,
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], json!("USER_TYPING"));
        assert_eq!(value["data"]["userId"], json!(user.to_string()));
        assert_eq!(value["data"]["isTyping"], json!(true));
        assert_eq!(envelope.kind(), "USER_TYPING");
    }
}
