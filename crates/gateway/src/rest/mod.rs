//! REST API endpoints for the gateway

pub mod health;
pub mod message;

use std::sync::Arc;

use axum::Router;

use crate::state::GatewayState;

pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .merge(health::create_health_routes())
        .nest("/api", message::create_message_routes())
}
