//! Connection authentication gate.
//!
//! Every inbound frame passes through [`ConnectionAuthGate::intercept`] before
//! dispatch. The gate never rejects a frame: a failed claim degrades the
//! connection to anonymous, and anonymous senders are stopped later by the
//! membership guard.

use tracing::{debug, info};

use super::identity_resolver::IdentityResolver;
use crate::entities::Session;
use crate::types::{Frame, USER_ID_HEADER};

pub struct ConnectionAuthGate {
    resolver: IdentityResolver,
}

impl ConnectionAuthGate {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// Bind the session to the identity claimed in `frame`, if this is the
    /// first claim seen on the connection. The frame is returned unchanged.
    pub async fn intercept(&self, frame: Frame, session: &Session) -> Frame {
        if session.claim_settled() {
            return frame;
        }

        let Some(claim) = frame.header(USER_ID_HEADER) else {
            return frame;
        };

        let outcome = self.resolver.resolve(claim).await;
        if session.settle_claim(outcome) {
            match outcome {
                Some(identity) => {
                    info!(session_id = %session.id(), %identity, "session bound to identity")
                }
                None => debug!(session_id = %session.id(), "session continues anonymously"),
            }
        }

        frame
    }
}
