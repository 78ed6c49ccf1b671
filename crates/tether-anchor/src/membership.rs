//! What the network currently requires.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tether_topology::{LevelId, RegionCoord};

/// Snapshot of the regions a network requires in one level.
///
/// Distinct regions plus a demand weight per region (how many network
/// members sit in it). Anchors only look at membership; the weight is there
/// for hosts and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredRegions {
    demand: HashMap<RegionCoord, u32>,
}

impl RequiredRegions {
    /// Create an empty requirement.
    pub fn new() -> Self {
        Self {
            demand: HashMap::new(),
        }
    }

    /// Add one unit of demand for a region.
    pub fn add(&mut self, coord: RegionCoord) {
        *self.demand.entry(coord).or_insert(0) += 1;
    }

    /// Set the demand weight for a region. Zero removes it.
    pub fn set_demand(&mut self, coord: RegionCoord, weight: u32) {
        if weight == 0 {
            self.demand.remove(&coord);
        } else {
            self.demand.insert(coord, weight);
        }
    }

    /// Check whether a region is required (weight ignored).
    pub fn contains(&self, coord: &RegionCoord) -> bool {
        self.demand.contains_key(coord)
    }

    /// Demand weight of a region, zero if not required.
    pub fn demand(&self, coord: &RegionCoord) -> u32 {
        self.demand.get(coord).copied().unwrap_or(0)
    }

    /// Distinct required regions.
    pub fn regions(&self) -> impl Iterator<Item = &RegionCoord> {
        self.demand.keys()
    }

    /// Number of distinct required regions.
    pub fn len(&self) -> usize {
        self.demand.len()
    }

    /// Check if nothing is required.
    pub fn is_empty(&self) -> bool {
        self.demand.is_empty()
    }

    /// Sum of all demand weights.
    pub fn total_demand(&self) -> u64 {
        self.demand.values().map(|&w| w as u64).sum()
    }
}

/// Builds a requirement from a multiset of regions (one entry per member).
impl FromIterator<RegionCoord> for RequiredRegions {
    fn from_iter<I: IntoIterator<Item = RegionCoord>>(iter: I) -> Self {
        let mut required = Self::new();
        for coord in iter {
            required.add(coord);
        }
        required
    }
}

/// Change notification from a network's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MembershipEvent {
    /// A region became required (its demand went from zero to one).
    RegionAdded { level: LevelId, coord: RegionCoord },
    /// A region stopped being required (its demand dropped to zero).
    RegionRemoved { level: LevelId, coord: RegionCoord },
}

impl MembershipEvent {
    /// Level the event refers to.
    pub fn level(&self) -> LevelId {
        match self {
            MembershipEvent::RegionAdded { level, .. } => *level,
            MembershipEvent::RegionRemoved { level, .. } => *level,
        }
    }

    /// Region the event refers to.
    pub fn coord(&self) -> RegionCoord {
        match self {
            MembershipEvent::RegionAdded { coord, .. } => *coord,
            MembershipEvent::RegionRemoved { coord, .. } => *coord,
        }
    }
}
