//! Message REST endpoints
//!
//! Messages created over HTTP are pushed to the chat's live subscribers
//! exactly as if they had been published on a socket.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use relay_chats::{ChatMessage, Identity, MessageRequest};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub sender_id: Option<Identity>,
    pub content: String,
}

pub fn create_message_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/chats/:chat_id/messages", post(create_message))
}

/// `POST /api/chats/{chat_id}/messages`
///
/// 201 with the stored message, 400 for an unreadable chat id or body, 403
/// when the sender is not a member of the chat, 500 when persistence fails.
pub async fn create_message(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> GatewayResult<impl IntoResponse> {
    let Path(chat_id) = path?;
    let Json(payload) = body?;

    if !state.guard.authorize(chat_id, payload.sender_id).await {
        return Err(GatewayError::AuthorizationFailed(format!(
            "sender is not a member of chat {chat_id}"
        )));
    }

    let request = MessageRequest {
        sender_id: payload.sender_id,
        chat_id: Some(chat_id),
        content: payload.content,
    };

    let message: ChatMessage = state.messages.create(&request).await.map_err(|error| {
        warn!(%chat_id, %error, "failed to persist message");
        GatewayError::from(error)
    })?;

    let outcome = state.handler.router().rebroadcast(&message).await;
    info!(%chat_id, message_id = %message.id, ?outcome, "message created over http");

    Ok((StatusCode::CREATED, Json(message)))
}
