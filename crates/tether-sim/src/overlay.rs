//! Overlay rendering registry for display replicas.

use std::collections::{HashMap, HashSet};

use tether_anchor::OverlayHooks;
use tether_topology::{OwnerId, RegionCoord};

/// Areas currently highlighted, by owning anchor.
#[derive(Debug, Clone, Default)]
pub struct OverlayRegistry {
    areas: HashMap<OwnerId, HashSet<RegionCoord>>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn area(&self, owner: &OwnerId) -> Option<&HashSet<RegionCoord>> {
        self.areas.get(owner)
    }

    /// Whether any anchor's overlay covers `coord`.
    pub fn is_highlighted(&self, coord: &RegionCoord) -> bool {
        self.areas.values().any(|area| area.contains(coord))
    }

    /// Number of anchors with an active overlay.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl OverlayHooks for OverlayRegistry {
    fn show_area(&mut self, owner: &OwnerId, regions: &HashSet<RegionCoord>) {
        self.areas.insert(*owner, regions.clone());
    }

    fn remove_handlers(&mut self, owner: &OwnerId) {
        self.areas.remove(owner);
    }
}
