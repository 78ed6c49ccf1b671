//! Tether Region Topology
//!
//! Coordinates shared by everything that force-loads regions.
//!
//! # Grid
//!
//! Each level is partitioned into square columns ("regions") of
//! [`REGION_WIDTH`] world units along x and z. A node at [`NodePos`] lives in
//! exactly one [`RegionCoord`]; height never changes the region.
//!
//! # Ownership
//!
//! Region tickets are keyed by [`OwnerId`]: the level plus the position of the
//! node that holds them. Position-derived identity needs no allocation and is
//! stable across restarts.
//!
//! # Neighborhoods
//!
//! [`Square`] enumerates the `(2r + 1)²` regions around a centre. Anchors use
//! it to bridge the gap after a relocation, before their network re-forms.

mod owner;
mod position;
mod region;
mod square;

pub use owner::OwnerId;
pub use position::{LevelId, NodePos};
pub use region::{RegionCoord, REGION_SHIFT, REGION_WIDTH};
pub use square::{square_area, Square};
