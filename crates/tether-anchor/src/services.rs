//! Collaborators an anchor talks to.
//!
//! Everything here is owned by the host. The anchor borrows the whole set for
//! the duration of one call through [`Services`], so it can never run
//! concurrently with itself and never holds on to a collaborator.

use std::collections::HashSet;

use tether_topology::{LevelId, OwnerId, RegionCoord};

use crate::RequiredRegions;

/// Pins and unpins regions on behalf of owners.
///
/// Both calls must be idempotent: forcing a region the owner already holds,
/// or releasing one it does not hold, succeeds without effect. The loader
/// reference-counts across owners; an anchor only ever touches its own
/// tickets.
pub trait RegionLoader {
    /// Pin `coord` for `owner`. Returns false if the loader refused
    /// (limit reached, level unavailable).
    fn force_region(&mut self, owner: &OwnerId, coord: RegionCoord) -> bool;

    /// Drop `owner`'s pin on `coord`. Returns false if the loader could not
    /// process the release.
    fn release_region(&mut self, owner: &OwnerId, coord: RegionCoord) -> bool;
}

/// Read side of a network's membership.
pub trait MembershipSource {
    /// Regions the network currently requires in `level`.
    fn required_regions(&self, level: LevelId) -> RequiredRegions;
}

/// Receives the idle energy cost of a device.
pub trait EnergyAccountor {
    fn set_idle_usage(&mut self, owner: &OwnerId, usage: u64);
}

/// Host scheduler primitive to wake a sleeping device.
pub trait DeviceAlerts {
    fn alert_device(&mut self, owner: &OwnerId);
}

/// Display-side overlay rendering hooks.
pub trait OverlayHooks {
    /// Start showing the given regions for `owner`.
    fn show_area(&mut self, owner: &OwnerId, regions: &HashSet<RegionCoord>);

    /// Stop showing anything for `owner`.
    fn remove_handlers(&mut self, owner: &OwnerId);
}

/// Borrowed collaborators for one anchor call.
pub struct Services<'a> {
    /// Region loader shared by every owner
    pub loader: &'a mut dyn RegionLoader,
    /// Membership of the anchor's network; `None` while it has no network
    pub membership: Option<&'a dyn MembershipSource>,
    /// Energy accounting for the anchor's node
    pub energy: &'a mut dyn EnergyAccountor,
    /// Wake-up primitive of the host scheduler
    pub alerts: &'a mut dyn DeviceAlerts,
}

impl<'a> Services<'a> {
    pub fn new(
        loader: &'a mut dyn RegionLoader,
        membership: Option<&'a dyn MembershipSource>,
        energy: &'a mut dyn EnergyAccountor,
        alerts: &'a mut dyn DeviceAlerts,
    ) -> Self {
        Self {
            loader,
            membership,
            energy,
            alerts,
        }
    }

    /// Current requirement for `level`, if attached to a network.
    pub fn required_regions(&self, level: LevelId) -> Option<RequiredRegions> {
        self.membership.map(|m| m.required_regions(level))
    }
}

impl<'a> std::fmt::Debug for Services<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("has_membership", &self.membership.is_some())
            .finish_non_exhaustive()
    }
}
