//! Region coordinates.
//!
//! The world is partitioned into square columns of `1 << REGION_SHIFT` units
//! along `x` and `z`. A region is the unit that can be force-loaded
//! independently, so every region has exactly one `RegionCoord`.
//!
//! Coordinates pack losslessly into a single `i64` (`x` in the low half,
//! `z` in the high half) for compact transfer over the sync stream.

use std::ops::{Add, Neg, Sub};

/// log2 of the region width in world units.
pub const REGION_SHIFT: u32 = 4;

/// Width of a region in world units.
pub const REGION_WIDTH: i64 = 1 << REGION_SHIFT;

/// A region position on the 2D region grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionCoord {
    /// Column along the x axis
    pub x: i32,
    /// Column along the z axis
    pub z: i32,
}

impl RegionCoord {
    /// Region containing the world origin.
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    /// Create a new region coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing the given world column.
    ///
    /// Uses an arithmetic shift, so negative world positions round towards
    /// negative infinity: world x = -1 lives in region x = -1, not 0.
    /// Positions beyond the grid clamp to its edge.
    pub const fn containing(world_x: i64, world_z: i64) -> Self {
        Self {
            x: saturate(world_x >> REGION_SHIFT),
            z: saturate(world_z >> REGION_SHIFT),
        }
    }

    /// Offset by `(dx, dz)`, or `None` if the result leaves the grid.
    pub const fn checked_offset(&self, dx: i32, dz: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.z.checked_add(dz)) {
            (Some(x), Some(z)) => Some(Self { x, z }),
            _ => None,
        }
    }

    /// Pack into a single `i64`.
    pub const fn pack(&self) -> i64 {
        (self.x as u32 as i64) | ((self.z as u32 as i64) << 32)
    }

    /// Inverse of [`pack`](Self::pack).
    pub const fn unpack(packed: i64) -> Self {
        Self {
            x: packed as i32,
            z: (packed >> 32) as i32,
        }
    }

    /// Chebyshev distance: the radius of the smallest square centred on
    /// `self` that contains `other`.
    pub fn chebyshev_distance(&self, other: &Self) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx.max(dz).min(u32::MAX as u64) as u32
    }

    /// Lowest world x coordinate inside this region.
    pub const fn min_world_x(&self) -> i64 {
        (self.x as i64) << REGION_SHIFT
    }

    /// Lowest world z coordinate inside this region.
    pub const fn min_world_z(&self) -> i64 {
        (self.z as i64) << REGION_SHIFT
    }
}

const fn saturate(v: i64) -> i32 {
    if v > i32::MAX as i64 {
        i32::MAX
    } else if v < i32::MIN as i64 {
        i32::MIN
    } else {
        v as i32
    }
}

impl Add for RegionCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            z: self.z + other.z,
        }
    }
}

impl Sub for RegionCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            z: self.z - other.z,
        }
    }
}

impl Neg for RegionCoord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            z: -self.z,
        }
    }
}

impl From<(i32, i32)> for RegionCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn containing_rounds_down() {
        assert_eq!(RegionCoord::containing(0, 0), RegionCoord::ORIGIN);
        assert_eq!(RegionCoord::containing(15, 15), RegionCoord::ORIGIN);
        assert_eq!(RegionCoord::containing(16, 0), RegionCoord::new(1, 0));
        assert_eq!(RegionCoord::containing(-1, -16), RegionCoord::new(-1, -1));
        assert_eq!(RegionCoord::containing(-17, 0), RegionCoord::new(-2, 0));
    }

    #[test]
    fn containing_clamps_to_grid_edge() {
        assert_eq!(RegionCoord::containing(1 << 40, 0), RegionCoord::new(i32::MAX, 0));
        assert_eq!(RegionCoord::containing(0, -(1 << 40)), RegionCoord::new(0, i32::MIN));
        assert_eq!(
            RegionCoord::containing(i64::MAX, i64::MIN),
            RegionCoord::new(i32::MAX, i32::MIN)
        );
        // Last in-grid column is still exact
        let edge = (i32::MAX as i64) << 4;
        assert_eq!(RegionCoord::containing(edge, 0).x, i32::MAX);
    }

    #[test]
    fn checked_offset_stops_at_edge() {
        let edge = RegionCoord::new(i32::MAX, i32::MIN);
        assert_eq!(edge.checked_offset(-1, 1), Some(RegionCoord::new(i32::MAX - 1, i32::MIN + 1)));
        assert_eq!(edge.checked_offset(1, 0), None);
        assert_eq!(edge.checked_offset(0, -1), None);
    }

    #[test]
    fn pack_known_values() {
        assert_eq!(RegionCoord::ORIGIN.pack(), 0);
        assert_eq!(RegionCoord::new(1, 0).pack(), 1);
        assert_eq!(RegionCoord::new(0, 1).pack(), 1 << 32);
        assert_eq!(RegionCoord::new(-1, 0).pack(), 0xFFFF_FFFF);
    }

    #[test]
    fn chebyshev_distance_is_max_axis() {
        let a = RegionCoord::new(2, -3);
        assert_eq!(a.chebyshev_distance(&RegionCoord::ORIGIN), 3);
        assert_eq!(RegionCoord::ORIGIN.chebyshev_distance(&a), 3);
        assert_eq!(a.chebyshev_distance(&a), 0);

        let far = RegionCoord::new(i32::MIN, 0);
        assert_eq!(far.chebyshev_distance(&RegionCoord::new(i32::MAX, 0)), u32::MAX);
    }

    #[test]
    fn world_bounds() {
        let r = RegionCoord::new(-2, 3);
        assert_eq!(r.min_world_x(), -32);
        assert_eq!(r.min_world_z(), 48);
        assert_eq!(RegionCoord::containing(r.min_world_x(), r.min_world_z()), r);
    }

    #[test]
    fn arithmetic() {
        let a = RegionCoord::new(1, 2);
        let b = RegionCoord::new(4, -1);
        assert_eq!(a + b, RegionCoord::new(5, 1));
        assert_eq!(a - b, RegionCoord::new(-3, 3));
        assert_eq!(a + (-b), a - b);
    }

    proptest! {
        #[test]
        fn pack_is_lossless(x in any::<i32>(), z in any::<i32>()) {
            let coord = RegionCoord::new(x, z);
            prop_assert_eq!(RegionCoord::unpack(coord.pack()), coord);
        }
    }
}
