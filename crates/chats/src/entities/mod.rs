//! Domain entities for the relay.
//!
//! Persisted chat messages and the per-connection session state.

pub mod message;
pub mod session;

pub use message::ChatMessage;
pub use session::Session;
