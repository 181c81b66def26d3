//! Per-connection session state.

use std::sync::OnceLock;

use crate::types::{Identity, SessionId};

/// State for a single live connection.
///
/// The identity claim is settled at most once: the first frame carrying a
/// claim decides whether the session is bound to an identity or stays
/// anonymous for the rest of its lifetime.
#[derive(Debug, Default)]
pub struct Session {
    id: SessionId,
    claim: OnceLock<Option<Identity>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Identity bound to this connection, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.claim.get().copied().flatten()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// Whether an identity claim has already been evaluated.
    pub fn claim_settled(&self) -> bool {
        self.claim.get().is_some()
    }

    /// Record the outcome of the identity claim. Returns false if a claim was
    /// already settled, in which case nothing changes.
    pub(crate) fn settle_claim(&self, outcome: Option<Identity>) -> bool {
        self.claim.set(outcome).is_ok()
    }
}
