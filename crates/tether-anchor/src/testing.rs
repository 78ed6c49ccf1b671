//! In-crate doubles for the anchor's collaborators.

use std::collections::{HashMap, HashSet};

use tether_topology::{LevelId, NodePos, OwnerId, RegionCoord};

use crate::{
    DeviceAlerts, EnergyAccountor, MembershipSource, OverlayHooks, RegionLoader,
    RequiredRegions, Services,
};

pub fn owner_at_origin() -> OwnerId {
    OwnerId::new(LevelId::OVERWORLD, NodePos::ORIGIN)
}

pub fn rc(x: i32, z: i32) -> RegionCoord {
    RegionCoord::new(x, z)
}

#[derive(Debug, Default)]
pub struct FakeLoader {
    pub tickets: HashMap<OwnerId, HashSet<RegionCoord>>,
    pub refuse: HashSet<RegionCoord>,
    pub fail_releases: bool,
    pub force_calls: usize,
    pub release_calls: usize,
}

impl FakeLoader {
    pub fn held_by(&self, owner: &OwnerId) -> HashSet<RegionCoord> {
        self.tickets.get(owner).cloned().unwrap_or_default()
    }
}

impl RegionLoader for FakeLoader {
    fn force_region(&mut self, owner: &OwnerId, coord: RegionCoord) -> bool {
        self.force_calls += 1;
        if self.refuse.contains(&coord) {
            return false;
        }
        self.tickets.entry(*owner).or_default().insert(coord);
        true
    }

    fn release_region(&mut self, owner: &OwnerId, coord: RegionCoord) -> bool {
        self.release_calls += 1;
        if self.fail_releases {
            return false;
        }
        if let Some(held) = self.tickets.get_mut(owner) {
            held.remove(&coord);
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct FakeNetwork {
    pub level: LevelId,
    pub members: Vec<RegionCoord>,
}

impl FakeNetwork {
    pub fn require(&mut self, coord: RegionCoord) {
        self.members.push(coord);
    }

    pub fn drop_all(&mut self, coord: RegionCoord) {
        self.members.retain(|c| *c != coord);
    }
}

impl MembershipSource for FakeNetwork {
    fn required_regions(&self, level: LevelId) -> RequiredRegions {
        if level != self.level {
            return RequiredRegions::new();
        }
        self.members.iter().copied().collect()
    }
}

#[derive(Debug, Default)]
pub struct FakeEnergy {
    pub usage: HashMap<OwnerId, u64>,
    pub pushes: usize,
}

impl EnergyAccountor for FakeEnergy {
    fn set_idle_usage(&mut self, owner: &OwnerId, usage: u64) {
        self.pushes += 1;
        self.usage.insert(*owner, usage);
    }
}

#[derive(Debug, Default)]
pub struct FakeAlerts {
    pub alerts: Vec<OwnerId>,
}

impl DeviceAlerts for FakeAlerts {
    fn alert_device(&mut self, owner: &OwnerId) {
        self.alerts.push(*owner);
    }
}

#[derive(Debug, Default)]
pub struct FakeOverlay {
    pub shown: HashMap<OwnerId, HashSet<RegionCoord>>,
    pub removals: usize,
}

impl OverlayHooks for FakeOverlay {
    fn show_area(&mut self, owner: &OwnerId, regions: &HashSet<RegionCoord>) {
        self.shown.insert(*owner, regions.clone());
    }

    fn remove_handlers(&mut self, owner: &OwnerId) {
        self.removals += 1;
        self.shown.remove(owner);
    }
}

/// Every collaborator in one place.
#[derive(Debug)]
pub struct Harness {
    pub loader: FakeLoader,
    pub network: FakeNetwork,
    pub energy: FakeEnergy,
    pub alerts: FakeAlerts,
    /// Whether the anchor's node belongs to a network at all
    pub attached: bool,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            loader: FakeLoader::default(),
            network: FakeNetwork::default(),
            energy: FakeEnergy::default(),
            alerts: FakeAlerts::default(),
            attached: true,
        }
    }
}

impl Harness {
    pub fn with_required(coords: &[RegionCoord]) -> Self {
        let mut harness = Self::default();
        for &c in coords {
            harness.network.require(c);
        }
        harness
    }

    pub fn services(&mut self) -> Services<'_> {
        let membership: Option<&dyn MembershipSource> = if self.attached {
            Some(&self.network)
        } else {
            None
        };
        Services::new(
            &mut self.loader,
            membership,
            &mut self.energy,
            &mut self.alerts,
        )
    }
}
