//! Error types for the relay core.
//!
//! None of these reach a connected client: the realtime path absorbs them and
//! only logs. They exist so the reason for a drop can be named.

use thiserror::Error;

use super::ids::Identity;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a storage collaborator.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Invalid record: {message}")]
    Invalid { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database { message: message.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }
}

/// Why an identity claim did not produce an identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity token is not a hyphenated uuid: {0:?}")]
    Malformed(String),

    #[error("no user with id {0}")]
    Unknown(Identity),

    #[error("user lookup failed: {0}")]
    Lookup(#[from] StoreError),
}

/// Frame codec failures.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("frame is missing the {0} header")]
    MissingHeader(&'static str),
}
