//! World positions and levels.

use std::ops::{Add, Sub};

use crate::RegionCoord;

/// Identifier of a level (an independent world with its own region grid).
///
/// Regions with equal coordinates in different levels are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelId(pub u32);

impl LevelId {
    /// The default level.
    pub const OVERWORLD: Self = Self(0);
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level#{}", self.0)
    }
}

/// A node position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl NodePos {
    /// World origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a new position.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// The region this position lies in. Height does not matter.
    pub const fn region(&self) -> RegionCoord {
        RegionCoord::containing(self.x, self.z)
    }

    /// Offset along the x axis.
    pub const fn east(&self, n: i64) -> Self {
        Self { x: self.x + n, ..*self }
    }

    /// Offset along the z axis.
    pub const fn south(&self, n: i64) -> Self {
        Self { z: self.z + n, ..*self }
    }
}

impl Add for NodePos {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for NodePos {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::fmt::Display for NodePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
