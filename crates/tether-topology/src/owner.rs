//! Owner identity for region tickets.
//!
//! Tickets are keyed by the position of the node that requested them, so an
//! owner's identity survives restarts without any allocated ids.

use crate::{LevelId, NodePos, RegionCoord};

/// Stable identity of a region holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnerId {
    /// Level the owner lives in (and loads regions in)
    pub level: LevelId,
    /// Position of the owning node
    pub pos: NodePos,
}

impl OwnerId {
    pub const fn new(level: LevelId, pos: NodePos) -> Self {
        Self { level, pos }
    }

    /// Region the owner itself sits in.
    pub const fn home_region(&self) -> RegionCoord {
        self.pos.region()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.level, self.pos)
    }
}
