//! Chat WebSocket handler
//!
//! Each socket gets a [`Session`] and a bounded outbound queue. Text messages
//! are decoded into frames and handed to the connection handler; deliveries
//! from the broker are written back as `MESSAGE` frames.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use relay_chats::{Delivery, Frame, FrameFlow, Session};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::GatewayState;

pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_websocket(socket, state))
}

async fn handle_chat_websocket(socket: WebSocket, state: Arc<GatewayState>) {
    let session = Arc::new(Session::new());
    info!(session_id = %session.id(), "websocket connected");

    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut deliveries) = mpsc::channel::<Arc<Delivery>>(state.subscriber_buffer);

    // Outgoing broadcasts
    let send_session_id = session.id();
    let mut send_task = tokio::spawn(async move {
        while let Some(delivery) = deliveries.recv().await {
            let text = match delivery.encode() {
                Ok(text) => text,
                Err(error) => {
                    warn!(session_id = %send_session_id, %error, "failed to encode delivery");
                    continue;
                }
            };

            if sender.send(Message::Text(text)).await.is_err() {
                debug!(session_id = %send_session_id, "socket write failed");
                break;
            }
        }
    });

    // Incoming frames
    let receive_state = state.clone();
    let receive_session = session.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    let frame = match Frame::decode(&text) {
                        Ok(frame) => frame,
                        Err(error) => {
                            debug!(session_id = %receive_session.id(), %error, "ignoring undecodable frame");
                            continue;
                        }
                    };

                    let flow = receive_state
                        .handler
                        .handle(&receive_session, &outbound, frame)
                        .await;
                    if flow == FrameFlow::Close {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut receive_task => send_task.abort(),
        _ = &mut send_task => receive_task.abort(),
    }

    state.handler.close(&session).await;
}
