//! Shared types for the relay core.
//!
//! Identifiers, wire frames, inbound requests and outbound envelopes that are
//! used across the services of the crate.

pub mod errors;
pub mod events;
pub mod frames;
pub mod ids;
pub mod requests;

pub use errors::{FrameError, IdentityError, StoreError, StoreResult};
pub use events::Envelope;
pub use frames::{Command, Delivery, Frame, DESTINATION_HEADER, USER_ID_HEADER};
pub use ids::{ChatId, Identity, SessionId, Topic};
pub use requests::{MessageRequest, TypingRequest};
