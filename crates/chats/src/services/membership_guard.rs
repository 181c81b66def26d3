//! Membership check guarding publishes into a chat.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::repositories::ChatStore;
use crate::types::{ChatId, Identity};

/// Decides whether a sender may publish into a chat.
///
/// Membership can change between messages, so nothing is cached.
#[derive(Clone)]
pub struct ChatMembershipGuard {
    chats: Arc<dyn ChatStore>,
}

impl ChatMembershipGuard {
    pub fn new(chats: Arc<dyn ChatStore>) -> Self {
        Self { chats }
    }

    pub async fn authorize(&self, chat_id: ChatId, sender: Option<Identity>) -> bool {
        let Some(sender) = sender else {
            debug!(%chat_id, "publish without sender identity denied");
            return false;
        };

        match self.chats.is_member(chat_id, sender).await {
            Ok(true) => {
                debug!(%chat_id, %sender, "sender authorized");
                true
            }
            Ok(false) => {
                debug!(%chat_id, %sender, "sender is not a member of the chat");
                false
            }
            Err(error) => {
                warn!(%chat_id, %sender, %error, "membership lookup failed");
                false
            }
        }
    }
}
