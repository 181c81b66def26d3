//! Internal utilities for the relay core.

pub mod destination;

pub use destination::{DestinationPattern, PathVariables};
