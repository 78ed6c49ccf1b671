//! Network membership and its subscribers.

use std::collections::HashMap;

use tracing::trace;

use tether_anchor::{MembershipEvent, MembershipSource, RequiredRegions};
use tether_topology::{LevelId, NodePos, OwnerId, RegionCoord};

/// Per-region node counts of one network.
///
/// A region is required while at least one node of the network sits in it.
/// Crossing zero in either direction produces a [`MembershipEvent`].
#[derive(Debug, Clone, Default)]
pub struct NetworkStatistics {
    regions: HashMap<LevelId, HashMap<RegionCoord, u32>>,
    powered: bool,
}

impl NetworkStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Returns true if the power state changed.
    pub fn set_powered(&mut self, powered: bool) -> bool {
        std::mem::replace(&mut self.powered, powered) != powered
    }

    /// Count a node joining the network.
    pub fn add_node(&mut self, level: LevelId, pos: NodePos) -> Option<MembershipEvent> {
        let coord = pos.region();
        let count = self
            .regions
            .entry(level)
            .or_default()
            .entry(coord)
            .or_insert(0);
        *count += 1;
        trace!("{} region {} now has {} nodes", level, coord, count);

        (*count == 1).then_some(MembershipEvent::RegionAdded { level, coord })
    }

    /// Count a node leaving the network.
    pub fn remove_node(&mut self, level: LevelId, pos: NodePos) -> Option<MembershipEvent> {
        let coord = pos.region();
        let regions = self.regions.get_mut(&level)?;
        let count = regions.get_mut(&coord)?;
        *count = count.saturating_sub(1);
        trace!("{} region {} now has {} nodes", level, coord, count);

        if *count == 0 {
            regions.remove(&coord);
            return Some(MembershipEvent::RegionRemoved { level, coord });
        }
        None
    }

    /// Nodes counted in `coord`.
    pub fn node_count(&self, level: LevelId, coord: RegionCoord) -> u32 {
        self.regions
            .get(&level)
            .and_then(|regions| regions.get(&coord))
            .copied()
            .unwrap_or(0)
    }

    /// Number of required regions in `level`.
    pub fn region_count(&self, level: LevelId) -> usize {
        self.regions.get(&level).map_or(0, HashMap::len)
    }
}

impl MembershipSource for NetworkStatistics {
    fn required_regions(&self, level: LevelId) -> RequiredRegions {
        let mut required = RequiredRegions::new();
        if let Some(regions) = self.regions.get(&level) {
            for (&coord, &count) in regions {
                required.set_demand(coord, count);
            }
        }
        required
    }
}

/// Anchors listening for membership events, in subscription order.
#[derive(Debug, Clone, Default)]
pub struct MembershipBus {
    subscribers: Vec<OwnerId>,
}

impl MembershipBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `owner` was already subscribed.
    pub fn subscribe(&mut self, owner: OwnerId) -> bool {
        if self.subscribers.contains(&owner) {
            return false;
        }
        self.subscribers.push(owner);
        true
    }

    /// Returns false if `owner` was not subscribed.
    pub fn unsubscribe(&mut self, owner: &OwnerId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|o| o != owner);
        self.subscribers.len() != before
    }

    pub fn subscribers(&self) -> &[OwnerId] {
        &self.subscribers
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
