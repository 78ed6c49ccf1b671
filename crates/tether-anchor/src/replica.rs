//! Display-side view of an anchor.

use std::collections::HashSet;

use tracing::trace;

use tether_topology::{OwnerId, RegionCoord};

use crate::services::OverlayHooks;
use crate::sync::SyncPacket;

/// Mirror of an authoritative anchor, fed only by [`SyncPacket`]s.
///
/// A replica never talks to the loader, the network or the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorReplica {
    owner: OwnerId,
    active: bool,
    display_overlay: bool,
    regions: HashSet<RegionCoord>,
}

impl AnchorReplica {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn display_overlay(&self) -> bool {
        self.display_overlay
    }

    /// Last regions received. Empty while the overlay is off.
    pub fn loaded_regions(&self) -> &HashSet<RegionCoord> {
        &self.regions
    }

    /// Apply an update from the authoritative side. Returns true if the
    /// visible state changed.
    ///
    /// Overlay handlers are always torn down first and re-registered only
    /// while the overlay is on.
    pub fn apply(&mut self, packet: &SyncPacket, hooks: &mut dyn OverlayHooks) -> bool {
        let regions = packet.region_set();
        let changed = self.active != packet.connected
            || self.display_overlay != packet.display_overlay
            || self.regions != regions;

        self.active = packet.connected;
        self.display_overlay = packet.display_overlay;
        self.regions = regions;

        hooks.remove_handlers(&self.owner);
        if self.display_overlay {
            hooks.show_area(&self.owner, &self.regions);
        }

        if changed {
            trace!(
                "{} replica updated: active={} overlay={} regions={}",
                self.owner,
                self.active,
                self.display_overlay,
                self.regions.len()
            );
        }
        changed
    }

    /// The replica is going away.
    pub fn set_removed(&mut self, hooks: &mut dyn OverlayHooks) {
        hooks.remove_handlers(&self.owner);
        self.regions.clear();
    }
}
