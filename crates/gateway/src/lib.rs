//! # Relay Gateway Crate
//!
//! HTTP and WebSocket surface of the chat relay.
//!
//! ## Architecture
//!
//! - **WebSocket**: `GET /ws`, one session per socket, JSON frames in and out
//! - **REST**: `POST /api/chats/:chat_id/messages` and `GET /health`
//! - **State**: the relay core wired around the configured stores
//! - **Middleware**: request tracing and CORS
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use relay_chats::InMemoryStore;
//! use relay_config::RelayConfig;
//! use relay_gateway::{create_router, GatewayState};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let state = GatewayState::new(store.clone(), store.clone(), store, &RelayConfig::default());
//! let _app = create_router(state);
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;

use std::sync::Arc;

use axum::Router;

pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);
    Router::new()
        .merge(rest::create_rest_routes().with_state(arc_state.clone()))
        .merge(websocket::create_websocket_routes().with_state(arc_state))
        .layer(middleware::create_cors_layer())
        .layer(middleware::create_trace_middleware())
}
