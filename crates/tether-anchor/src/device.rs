//! An anchor as a host sees it: authoritative on the simulation side, a
//! display replica everywhere else.

use tether_topology::{LevelId, OwnerId, RegionCoord};

use crate::anchor::Anchor;
use crate::error::{Error, Result};
use crate::replica::AnchorReplica;
use crate::services::{OverlayHooks, Services};

/// Either side of an anchor.
#[derive(Debug, Clone)]
pub enum AnchorDevice {
    Authoritative(Anchor),
    Replica(AnchorReplica),
}

impl AnchorDevice {
    pub fn owner(&self) -> &OwnerId {
        match self {
            AnchorDevice::Authoritative(anchor) => anchor.owner(),
            AnchorDevice::Replica(replica) => replica.owner(),
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self, AnchorDevice::Authoritative(_))
    }

    /// Level of an authoritative anchor. Asking a replica is a host bug.
    pub fn server_level(&self) -> Result<LevelId> {
        match self {
            AnchorDevice::Authoritative(anchor) => Ok(anchor.level()),
            AnchorDevice::Replica(replica) => Err(Error::NotAuthoritative(*replica.owner())),
        }
    }

    pub fn authoritative(&self) -> Result<&Anchor> {
        match self {
            AnchorDevice::Authoritative(anchor) => Ok(anchor),
            AnchorDevice::Replica(replica) => Err(Error::NotAuthoritative(*replica.owner())),
        }
    }

    pub fn authoritative_mut(&mut self) -> Result<&mut Anchor> {
        match self {
            AnchorDevice::Authoritative(anchor) => Ok(anchor),
            AnchorDevice::Replica(replica) => Err(Error::NotAuthoritative(*replica.owner())),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            AnchorDevice::Authoritative(anchor) => anchor.is_active(),
            AnchorDevice::Replica(replica) => replica.is_active(),
        }
    }

    /// Regions held (authoritative) or last displayed (replica).
    pub fn loaded_regions(&self) -> Vec<RegionCoord> {
        match self {
            AnchorDevice::Authoritative(anchor) => anchor.loaded_regions().iter().copied().collect(),
            AnchorDevice::Replica(replica) => replica.loaded_regions().iter().copied().collect(),
        }
    }

    /// Tear down either side.
    pub fn set_removed(&mut self, services: &mut Services<'_>, hooks: &mut dyn OverlayHooks) {
        match self {
            AnchorDevice::Authoritative(anchor) => anchor.set_removed(services),
            AnchorDevice::Replica(replica) => replica.set_removed(hooks),
        }
    }
}

impl From<Anchor> for AnchorDevice {
    fn from(anchor: Anchor) -> Self {
        AnchorDevice::Authoritative(anchor)
    }
}

impl From<AnchorReplica> for AnchorDevice {
    fn from(replica: AnchorReplica) -> Self {
        AnchorDevice::Replica(replica)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnchorConfig;
    use crate::testing::{owner_at_origin, rc, FakeOverlay, Harness};

    #[test]
    fn replica_refuses_server_queries() {
        let mut device: AnchorDevice = AnchorReplica::new(owner_at_origin()).into();

        assert!(matches!(device.server_level(), Err(Error::NotAuthoritative(_))));
        assert!(device.authoritative_mut().is_err());
        assert!(!device.is_authoritative());
    }

    #[test]
    fn authoritative_answers() {
        let device: AnchorDevice = Anchor::new(owner_at_origin(), AnchorConfig::default()).into();
        assert_eq!(device.server_level().unwrap(), LevelId::OVERWORLD);
        assert!(device.authoritative().is_ok());
    }

    #[test]
    fn removal_on_each_side() {
        let mut h = Harness::default();
        let mut overlay = FakeOverlay::default();

        let mut server: AnchorDevice = Anchor::new(owner_at_origin(), AnchorConfig::default()).into();
        server
            .authoritative_mut()
            .unwrap()
            .force(rc(1, 1), &mut h.services());
        server.set_removed(&mut h.services(), &mut overlay);
        assert!(server.loaded_regions().is_empty());
        assert!(h.loader.held_by(&owner_at_origin()).is_empty());
        assert_eq!(overlay.removals, 0);

        let mut client: AnchorDevice = AnchorReplica::new(owner_at_origin()).into();
        client.set_removed(&mut h.services(), &mut overlay);
        assert_eq!(overlay.removals, 1);
    }
}
