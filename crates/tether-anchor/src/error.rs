//! Error types for tether-anchor.

use tether_topology::OwnerId;
use thiserror::Error;

/// Result type for anchor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in anchor operations.
///
/// Loader failures are not errors: a refused force is retried by the next
/// diff and a failed release is logged and forgotten.
#[derive(Debug, Error)]
pub enum Error {
    /// Authoritative state was requested from a display replica.
    #[error("anchor {0} is a display replica and has no authoritative level")]
    NotAuthoritative(OwnerId),

    /// Settings could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A sync packet could not be encoded or decoded.
    #[error("sync packet codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// A configuration value was malformed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
