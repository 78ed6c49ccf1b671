//! Square neighborhoods on the region grid.
//!
//! A neighborhood of radius `r` around a centre is every region whose
//! Chebyshev distance to the centre is at most `r`: a `(2r + 1) × (2r + 1)`
//! square. Enumeration is row-major (x outer, z inner), matching the order
//! regions are forced in after a relocation.

use crate::RegionCoord;

/// Number of regions in a square of the given radius.
///
/// Formula: (2r + 1)²
#[inline]
pub const fn square_area(radius: u32) -> u64 {
    let side = 2 * radius as u64 + 1;
    side * side
}

/// Iterator over the regions of a square neighborhood.
///
/// Cells that would fall off the edge of the region grid are skipped, so a
/// square near the grid boundary yields fewer than [`square_area`] regions.
#[derive(Debug, Clone)]
pub struct Square {
    center: RegionCoord,
    radius: i32,
    dx: i32,
    dz: i32,
    done: bool,
}

impl Square {
    /// All regions within `radius` of `center` (inclusive).
    pub fn around(center: RegionCoord, radius: u32) -> Self {
        let radius = radius.min(i32::MAX as u32 / 2) as i32;
        Self {
            center,
            radius,
            dx: -radius,
            dz: -radius,
            done: false,
        }
    }

    /// Check whether a region lies inside this square.
    pub fn contains(&self, coord: RegionCoord) -> bool {
        self.center.chebyshev_distance(&coord) <= self.radius as u32
    }
}

impl Iterator for Square {
    type Item = RegionCoord;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let item = self.center.checked_offset(self.dx, self.dz);

            if self.dz < self.radius {
                self.dz += 1;
            } else if self.dx < self.radius {
                self.dx += 1;
                self.dz = -self.radius;
            } else {
                self.done = true;
            }

            if item.is_some() {
                return item;
            }
        }
        None
    }
}
