//! Resolution of identity claims made during the connection handshake.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::repositories::UserStore;
use crate::types::{Identity, IdentityError};

/// Turns a claimed token into a verified [`Identity`].
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Resolve a claim, naming the reason when it fails.
    pub async fn try_resolve(&self, claimed: &str) -> Result<Identity, IdentityError> {
        let identity = Identity::parse(claimed)?;

        if self.users.exists(identity).await? {
            Ok(identity)
        } else {
            Err(IdentityError::Unknown(identity))
        }
    }

    /// Resolve a claim. Malformed, unknown and unverifiable tokens all yield
    /// `None`, exactly as if no identity had been offered.
    pub async fn resolve(&self, claimed: &str) -> Option<Identity> {
        match self.try_resolve(claimed).await {
            Ok(identity) => {
                debug!(%identity, "identity claim resolved");
                Some(identity)
            }
            Err(IdentityError::Lookup(error)) => {
                warn!(%error, "identity lookup failed, treating connection as anonymous");
                None
            }
            Err(error) => {
                debug!(%error, "identity claim rejected");
                None
            }
        }
    }
}
