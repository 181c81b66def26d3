//! Services of the relay core.
//!
//! Each service takes its collaborators as constructor parameters. Together
//! they form the inbound path: gate, router, guard, store, broker.

pub mod auth_gate;
pub mod broker;
pub mod connection;
pub mod identity_resolver;
pub mod membership_guard;
pub mod message_router;

pub use auth_gate::ConnectionAuthGate;
pub use broker::{Broadcaster, DeliverySender, TopicBroker};
pub use connection::{ConnectionHandler, FrameFlow};
pub use identity_resolver::IdentityResolver;
pub use membership_guard::ChatMembershipGuard;
pub use message_router::{DropReason, MessageRouter, PublishOutcome, RouteAction};
