//! Error types for the reference host.

use tether_topology::{NodePos, OwnerId};
use thiserror::Error;

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in host operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Anchor error
    #[error("Anchor error: {0}")]
    Anchor(#[from] tether_anchor::Error),

    /// No anchor with this owner
    #[error("Unknown anchor: {0}")]
    UnknownAnchor(OwnerId),

    /// Position already holds a node
    #[error("Position occupied: {0}")]
    Occupied(NodePos),

    /// No node at this position
    #[error("Unknown node: {0}")]
    UnknownNode(NodePos),

    /// The node is an anchor and must be removed as one
    #[error("Node at {0} is an anchor")]
    AnchorNode(NodePos),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
